//! Secure storage primitives for encrypting custodial wallet material at rest.
//!
//! Uses AES-256-GCM with a key derived from a system-held master secret via
//! Argon2id. Unlike a machine-identity-derived key, this lets the encrypted
//! blob be restored on any host that is given the same secret, while the
//! memory-hard KDF keeps an attacker who steals the blob (but not the
//! secret) from brute-forcing it cheaply.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{self, Config as Argon2Config, Variant, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// An encrypted secret (mnemonic + derivation seed) together with everything
/// needed to re-derive its key and decrypt it later.
#[derive(Debug, Clone)]
pub struct EncryptedData {
    /// Base64-encoded ciphertext (includes the GCM authentication tag).
    pub ciphertext: String,
    /// Base64-encoded 12-byte nonce.
    pub nonce: String,
    /// Base64-encoded Argon2id salt used to derive the key for this blob.
    pub salt: String,
}

fn argon2_config() -> Argon2Config<'static> {
    Argon2Config {
        variant: Variant::Argon2id,
        version: Version::Version13,
        mem_cost: 19 * 1024,
        time_cost: 2,
        lanes: 1,
        ..Argon2Config::default()
    }
}

fn derive_key(master_secret: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], String> {
    let hash = argon2::hash_raw(master_secret.as_bytes(), salt, &argon2_config())
        .map_err(|e| format!("key derivation failed: {e}"))?;
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&hash[..KEY_LEN]);
    Ok(key)
}

/// Encrypt `plaintext` (a mnemonic or seed) under a key derived from
/// `master_secret`. A fresh random salt is generated per call so the same
/// secret never reuses a key across wallets.
pub fn encrypt_secret(master_secret: &str, plaintext: &str) -> Result<EncryptedData, String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let key = derive_key(master_secret, &salt)?;
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| format!("failed to create cipher: {e}"))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| format!("encryption failed: {e}"))?;

    Ok(EncryptedData {
        ciphertext: BASE64.encode(&ciphertext),
        nonce: BASE64.encode(nonce_bytes),
        salt: BASE64.encode(salt),
    })
}

/// Decrypt an [`EncryptedData`] envelope, re-deriving the key from
/// `master_secret` and the stored salt. Fails closed: a wrong secret or
/// tampered ciphertext returns an error, never corrupted plaintext.
pub fn decrypt_secret(master_secret: &str, encrypted: &EncryptedData) -> Result<String, String> {
    let salt = BASE64
        .decode(&encrypted.salt)
        .map_err(|e| format!("failed to decode salt: {e}"))?;
    let ciphertext = BASE64
        .decode(&encrypted.ciphertext)
        .map_err(|e| format!("failed to decode ciphertext: {e}"))?;
    let nonce_bytes = BASE64
        .decode(&encrypted.nonce)
        .map_err(|e| format!("failed to decode nonce: {e}"))?;

    if nonce_bytes.len() != NONCE_LEN {
        return Err(format!(
            "invalid nonce length: expected {NONCE_LEN} bytes, got {}",
            nonce_bytes.len()
        ));
    }

    let key = derive_key(master_secret, &salt)?;
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|e| format!("failed to create cipher: {e}"))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext_bytes = cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| "decryption failed: wrong secret or corrupted data".to_string())?;

    String::from_utf8(plaintext_bytes)
        .map_err(|e| format!("decrypted data is not valid UTF-8: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let secret = "correct-horse-battery-staple";
        let original = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

        let encrypted = encrypt_secret(secret, original).expect("encryption should succeed");

        assert!(!encrypted.ciphertext.is_empty());
        assert!(!encrypted.nonce.is_empty());
        assert!(!encrypted.salt.is_empty());
        assert_ne!(encrypted.ciphertext, original);

        let decrypted = decrypt_secret(secret, &encrypted).expect("decryption should succeed");
        assert_eq!(decrypted, original);
    }

    #[test]
    fn wrong_secret_fails_closed() {
        let encrypted = encrypt_secret("secret-a", "some mnemonic seed data").unwrap();
        let result = decrypt_secret("secret-b", &encrypted);
        assert!(result.is_err());
    }

    #[test]
    fn distinct_calls_use_distinct_salts() {
        let a = encrypt_secret("secret", "same plaintext").unwrap();
        let b = encrypt_secret("secret", "same plaintext").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
