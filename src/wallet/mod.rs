//! Secure Wallet Store (C1, §4.1): custodial keypair lifecycle for every
//! tenant. See `store.rs` for the implementation and `model.rs` for the
//! in-memory types it hands back.

pub mod model;
pub mod store;

pub use model::{ExportedKey, WalletHandle, WalletSummary};
pub use store::WalletStore;
