//! Secure Wallet Store (C1, §4.1).
//!
//! Owns custodial keypair creation/import/export and is the only component
//! that ever holds decrypted signing material. Metadata (public key,
//! derivation path, timestamps) lives in `Persistence`; the encrypted
//! mnemonic blob lives on disk, one file per wallet, keyed by public key
//! (§6). Decrypted `WalletHandle`s are cached in memory behind a per-user
//! single-flight load so concurrent callers for the same user share one
//! decrypt instead of racing (§4.1 edge case: "concurrent create/import for
//! the same user must not both succeed").

use std::collections::HashMap;
use std::sync::Arc;

use bip39::Mnemonic;
use chrono::Utc;
use solana_sdk::signer::keypair::keypair_from_seed_phrase_and_passphrase;
use tokio::sync::{Mutex, OnceCell};

use crate::config::WalletStoreConfig;
use crate::constants::VALID_MNEMONIC_WORD_COUNTS;
use crate::core::{CoreError, CoreResult, UserId};
use crate::logger::{self, LogTag};
use crate::paths;
use crate::persistence::{Persistence, WalletRow};
use crate::secure_storage::{self, EncryptedData};

use super::model::{ExportedKey, WalletHandle, WalletSummary};

const KDF_METHOD: &str = "argon2id";
const ENCRYPTION_METHOD: &str = "aes-256-gcm";
const DEFAULT_WORD_COUNT: usize = 12;

/// Custodial wallet store shared (`Arc<WalletStore>`) by the API surface,
/// the Balance Oracle, and the Trade Queue. Constructed once at composition
/// time — never a process-global singleton.
pub struct WalletStore {
    config: WalletStoreConfig,
    persistence: Arc<dyn Persistence>,
    handles: Mutex<HashMap<UserId, Arc<OnceCell<Arc<WalletHandle>>>>>,
}

impl WalletStore {
    pub fn new(config: WalletStoreConfig, persistence: Arc<dyn Persistence>) -> Self {
        Self {
            config,
            persistence,
            handles: Mutex::new(HashMap::new()),
        }
    }

    fn master_secret(&self) -> CoreResult<String> {
        std::env::var(&self.config.master_secret_env).map_err(|_| {
            CoreError::Fatal(format!(
                "master secret environment variable {} is not set",
                self.config.master_secret_env
            ))
        })
    }

    /// Generates a fresh mnemonic, derives a keypair from it, encrypts the
    /// mnemonic at rest, and records the wallet's metadata (§4.1 create).
    pub async fn create_wallet(&self, user_id: &str) -> CoreResult<WalletSummary> {
        if self
            .persistence
            .get_wallet_by_user(user_id)
            .await?
            .is_some()
        {
            return Err(CoreError::AlreadyExists {
                user_id: user_id.to_string(),
            });
        }

        let mnemonic = Mnemonic::generate(DEFAULT_WORD_COUNT)
            .map_err(|e| CoreError::Fatal(format!("mnemonic generation failed: {e}")))?;
        self.provision(user_id, &mnemonic.to_string(), DEFAULT_WORD_COUNT)
            .await
    }

    /// Imports an existing mnemonic supplied by the caller (§4.1 import).
    /// The caller is trusted to be the wallet's owner; authorization at the
    /// user-identity boundary is the API layer's responsibility (§4.10).
    pub async fn import_wallet(&self, user_id: &str, mnemonic_phrase: &str) -> CoreResult<WalletSummary> {
        if self
            .persistence
            .get_wallet_by_user(user_id)
            .await?
            .is_some()
        {
            return Err(CoreError::AlreadyExists {
                user_id: user_id.to_string(),
            });
        }

        let mnemonic = Mnemonic::parse(mnemonic_phrase.trim()).map_err(|_| CoreError::InvalidInput {
            reason: "mnemonic is not a valid BIP39 phrase".to_string(),
        })?;
        let word_count = mnemonic.word_count();
        if !VALID_MNEMONIC_WORD_COUNTS.contains(&word_count) {
            return Err(CoreError::InvalidInput {
                reason: format!(
                    "mnemonic has {word_count} words; expected one of {VALID_MNEMONIC_WORD_COUNTS:?}"
                ),
            });
        }

        self.provision(user_id, mnemonic_phrase.trim(), word_count).await
    }

    async fn provision(
        &self,
        user_id: &str,
        mnemonic_phrase: &str,
        word_count: usize,
    ) -> CoreResult<WalletSummary> {
        let keypair = keypair_from_seed_phrase_and_passphrase(mnemonic_phrase, "")
            .map_err(|e| CoreError::Fatal(format!("keypair derivation failed: {e}")))?;
        let public_key = keypair.pubkey().to_string();

        let master_secret = self.master_secret()?;
        let encrypted = secure_storage::encrypt_secret(&master_secret, mnemonic_phrase)
            .map_err(|e| CoreError::Fatal(format!("failed to encrypt wallet secret: {e}")))?;

        let blob_path = paths::get_wallet_blob_path(&public_key);
        write_blob(&blob_path, &encrypted).await?;

        let created_at = Utc::now();
        let row = WalletRow {
            wallet_id: 0,
            user_id: user_id.to_string(),
            public_key: public_key.clone(),
            derivation_path: self.config.derivation_path.clone(),
            mnemonic_word_count: word_count as i64,
            kdf_method: KDF_METHOD.to_string(),
            encryption_method: ENCRYPTION_METHOD.to_string(),
            created_at,
            last_unlocked: None,
            blob_path: blob_path.display().to_string(),
        };

        if let Err(e) = self.persistence.insert_wallet(&row).await {
            // Roll back the blob; otherwise a half-created wallet leaks an
            // encrypted secret with no metadata pointing at it (§4.1).
            let _ = tokio::fs::remove_file(&blob_path).await;
            logger::error(
                LogTag::Wallet,
                &format!("rolled back wallet blob for {user_id} after persistence failure: {e}"),
            );
            return Err(e);
        }

        self.cache_handle(user_id, Arc::new(WalletHandle::new(user_id.to_string(), keypair)))
            .await;

        logger::info(LogTag::Wallet, &format!("provisioned wallet for user {user_id}"));
        Ok(WalletSummary {
            user_id: user_id.to_string(),
            public_key,
            created_at,
        })
    }

    /// Decrypts and returns the mnemonic for `target_user_id`. Only the
    /// owning user may call this; enforcing that is the caller's job via
    /// `caller_id` (§4.10 P8).
    pub async fn export_key(&self, caller_id: &str, target_user_id: &str) -> CoreResult<ExportedKey> {
        if caller_id != target_user_id {
            return Err(CoreError::Unauthorized {
                caller: caller_id.to_string(),
                target: target_user_id.to_string(),
            });
        }

        let row = self
            .persistence
            .get_wallet_by_user(target_user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                user_id: target_user_id.to_string(),
            })?;

        let master_secret = self.master_secret()?;
        let encrypted = read_blob(&row.blob_path).await?;
        let mnemonic = secure_storage::decrypt_secret(&master_secret, &encrypted)
            .map_err(|e| CoreError::Fatal(format!("failed to decrypt wallet secret: {e}")))?;

        Ok(ExportedKey {
            user_id: target_user_id.to_string(),
            mnemonic,
            derivation_path: row.derivation_path,
        })
    }

    pub async fn get_public_key(&self, user_id: &str) -> CoreResult<String> {
        let row = self
            .persistence
            .get_wallet_by_user(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                user_id: user_id.to_string(),
            })?;
        Ok(row.public_key)
    }

    pub async fn list_user_ids(&self) -> CoreResult<Vec<String>> {
        self.persistence.list_user_ids().await
    }

    /// Returns the decrypted handle for `user_id`, loading and caching it on
    /// first use. Concurrent callers for the same user share one load
    /// (single-flight via `OnceCell`) instead of racing separate decrypts.
    pub async fn get_wallet_handle(&self, user_id: &str) -> CoreResult<Arc<WalletHandle>> {
        let cell = {
            let mut handles = self.handles.lock().await;
            handles
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let handle = cell
            .get_or_try_init(|| self.load_handle(user_id))
            .await?
            .clone();
        let _ = self.persistence.touch_last_unlocked(user_id).await;
        Ok(handle)
    }

    async fn load_handle(&self, user_id: &str) -> CoreResult<Arc<WalletHandle>> {
        let row = self
            .persistence
            .get_wallet_by_user(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                user_id: user_id.to_string(),
            })?;

        let master_secret = self.master_secret()?;
        let encrypted = read_blob(&row.blob_path).await?;
        let mnemonic = secure_storage::decrypt_secret(&master_secret, &encrypted)
            .map_err(|e| CoreError::Fatal(format!("failed to decrypt wallet secret: {e}")))?;
        let keypair = keypair_from_seed_phrase_and_passphrase(&mnemonic, "")
            .map_err(|e| CoreError::Fatal(format!("keypair derivation failed: {e}")))?;

        logger::debug(LogTag::Wallet, &format!("unlocked wallet for user {user_id}"));
        Ok(Arc::new(WalletHandle::new(user_id.to_string(), keypair)))
    }

    async fn cache_handle(&self, user_id: &str, handle: Arc<WalletHandle>) {
        let mut handles = self.handles.lock().await;
        let cell = handles
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        // `create_wallet`/`import_wallet` just minted this handle; seed the
        // cell so the next `get_wallet_handle` skips the disk round trip.
        let _ = cell.set(handle);
    }
}

async fn write_blob(path: &std::path::Path, encrypted: &EncryptedData) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::Fatal(format!("failed to create {parent:?}: {e}")))?;
    }
    let json = serde_json::json!({
        "ciphertext": encrypted.ciphertext,
        "nonce": encrypted.nonce,
        "salt": encrypted.salt,
    });
    tokio::fs::write(path, serde_json::to_vec(&json).unwrap())
        .await
        .map_err(|e| CoreError::Fatal(format!("failed to write wallet blob {path:?}: {e}")))
}

async fn read_blob(path: &str) -> CoreResult<EncryptedData> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CoreError::Fatal(format!("failed to read wallet blob {path}: {e}")))?;
    let json: serde_json::Value = serde_json::from_slice(&bytes)?;
    Ok(EncryptedData {
        ciphertext: json["ciphertext"].as_str().unwrap_or_default().to_string(),
        nonce: json["nonce"].as_str().unwrap_or_default().to_string(),
        salt: json["salt"].as_str().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::SqlitePersistence;

    fn set_master_secret() {
        std::env::set_var("TRADING_CORE_MASTER_SECRET", "test-master-secret");
    }

    fn temp_store() -> (WalletStore, tempfile::TempDir) {
        set_master_secret();
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", dir.path());
        let persistence = Arc::new(SqlitePersistence::open_in_memory().unwrap());
        (WalletStore::new(WalletStoreConfig::default(), persistence), dir)
    }

    #[tokio::test]
    async fn create_wallet_then_fetch_handle_round_trips_the_keypair() {
        let (store, _dir) = temp_store();
        let summary = store.create_wallet("U1").await.unwrap();
        let handle = store.get_wallet_handle("U1").await.unwrap();
        assert_eq!(handle.public_key_string(), summary.public_key);
    }

    #[tokio::test]
    async fn second_create_for_same_user_is_rejected() {
        let (store, _dir) = temp_store();
        store.create_wallet("U1").await.unwrap();
        let err = store.create_wallet("U1").await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn export_key_denies_non_owning_caller() {
        let (store, _dir) = temp_store();
        store.create_wallet("U1").await.unwrap();
        let err = store.export_key("U2", "U1").await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn export_key_round_trips_the_mnemonic() {
        let (store, _dir) = temp_store();
        store.create_wallet("U1").await.unwrap();
        let exported = store.export_key("U1", "U1").await.unwrap();
        let reimported_keypair =
            keypair_from_seed_phrase_and_passphrase(&exported.mnemonic, "").unwrap();
        let handle = store.get_wallet_handle("U1").await.unwrap();
        assert_eq!(reimported_keypair.pubkey(), handle.pubkey());
    }

    #[tokio::test]
    async fn import_rejects_malformed_mnemonic() {
        let (store, _dir) = temp_store();
        let err = store.import_wallet("U1", "not a real mnemonic phrase").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }
}
