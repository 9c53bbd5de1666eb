//! Persistence out-port (C11, §4.10).
//!
//! The core never sees a query string: business logic calls named repository
//! methods on the `Persistence` trait object, and every implementation is
//! required to use parameterized statements exclusively (§4.7, §7 PersistenceError,
//! P14). The shipped implementation is SQLite-backed (`sqlite.rs`), matching the
//! rest of this codebase's storage choice, but callers only ever see the trait.

pub mod models;
pub mod sqlite;

pub use models::{PreferencesRow, TradeOutcome, TradeRow, WalletRow};

use crate::core::CoreResult;
use async_trait::async_trait;

/// Minimal CRUD the core needs for wallet metadata rows.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn insert_wallet(&self, row: &WalletRow) -> CoreResult<i64>;
    async fn get_wallet_by_user(&self, user_id: &str) -> CoreResult<Option<WalletRow>>;
    async fn list_user_ids(&self) -> CoreResult<Vec<String>>;
    async fn touch_last_unlocked(&self, user_id: &str) -> CoreResult<()>;
    /// Removes a wallet row. Used only to roll back a failed creation
    /// (§4.1: "If persistence fails after encryption, the encrypted blob
    /// must be removed before returning") — never exposed as user-facing
    /// deletion (§3: "administrative deletion is out-of-scope").
    async fn delete_wallet(&self, user_id: &str) -> CoreResult<()>;
}

/// Append-only trade record storage, always filtered by `user_id` in the
/// query itself (§4.7: "queries MUST filter by user ID in the persistence
/// layer, not in process after an over-broad read").
#[async_trait]
pub trait TradeRepository: Send + Sync {
    async fn append_trade(&self, row: &TradeRow) -> CoreResult<i64>;
    async fn trades_for_user(&self, user_id: &str) -> CoreResult<Vec<TradeRow>>;
    /// Top-N users by total profit, already aggregated in SQL so no
    /// over-broad read ever touches a user ID that isn't in the result.
    async fn leaderboard(&self, limit: usize) -> CoreResult<Vec<(String, f64, u64, u64)>>;
}

/// Per-user preferences (enabled strategies, notification toggles; §3).
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    async fn get_preferences(&self, user_id: &str) -> CoreResult<Option<PreferencesRow>>;
    async fn upsert_preferences(&self, row: &PreferencesRow) -> CoreResult<()>;
}

/// The full persistence boundary, composed of the three repositories above.
/// Constructed once at composition time and shared (`Arc<dyn Persistence>`)
/// among C1, C7, and the scheduler.
pub trait Persistence: WalletRepository + TradeRepository + PreferencesRepository {}
impl<T: WalletRepository + TradeRepository + PreferencesRepository> Persistence for T {}
