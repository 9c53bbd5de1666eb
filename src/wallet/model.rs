//! In-memory wallet types. These never touch persistence or disk directly;
//! `store.rs` is the only thing that loads/decrypts them.

use chrono::{DateTime, Utc};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};

/// A decrypted, ready-to-sign wallet held in memory for the lifetime of the
/// process (or until evicted). Never serialized, never logged.
pub struct WalletHandle {
    pub user_id: String,
    keypair: Keypair,
}

impl WalletHandle {
    pub fn new(user_id: String, keypair: Keypair) -> Self {
        Self { user_id, keypair }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn public_key_string(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    /// Signing access for the Trade Queue's chain executor. Never exposed
    /// outside the core (§4.1: "the Trade Queue is the only component, other
    /// than the owning user's own export request, that ever borrows live
    /// signing capability").
    pub fn signer(&self) -> &Keypair {
        &self.keypair
    }
}

/// Metadata returned by `createWallet`/`importWallet`, safe to hand back to
/// a caller (§4.1, §6): no secret material.
#[derive(Debug, Clone)]
pub struct WalletSummary {
    pub user_id: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
}

/// The one-time export payload for `exportKey` (§4.1, §4.10 P8: only the
/// owning user may ever receive this).
#[derive(Debug, Clone)]
pub struct ExportedKey {
    pub user_id: String,
    pub mnemonic: String,
    pub derivation_path: String,
}
