//! Row types for the persistence out-port (C11). These are plain data; the
//! repository traits in `mod.rs` are the only things that touch SQL.

use serde::{Deserialize, Serialize};

/// One row in `secure_wallets` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRow {
    pub wallet_id: i64,
    pub user_id: String,
    pub public_key: String,
    pub derivation_path: String,
    pub mnemonic_word_count: i64,
    pub kdf_method: String,
    pub encryption_method: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_unlocked: Option<chrono::DateTime<chrono::Utc>>,
    pub blob_path: String,
}

/// Outcome of one trade submission attempt (§3 Trade Record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeOutcome {
    Success,
    Failed,
    TimedOut,
}

impl TradeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeOutcome::Success => "success",
            TradeOutcome::Failed => "failed",
            TradeOutcome::TimedOut => "timed-out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(TradeOutcome::Success),
            "failed" => Some(TradeOutcome::Failed),
            "timed-out" => Some(TradeOutcome::TimedOut),
            _ => None,
        }
    }
}

/// One row in the trade records table (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRow {
    pub trade_id: i64,
    pub user_id: String,
    pub strategy_name: String,
    pub action: String,
    pub amount: i64,
    pub profit: f64,
    pub tx_signature: Option<String>,
    pub outcome: TradeOutcome,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub details: serde_json::Value,
}

/// One row in `user_preferences` (§6, added by SPEC_FULL expansion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesRow {
    pub user_id: String,
    pub enabled_strategies: Vec<String>,
    pub notifications_enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Default for PreferencesRow {
    fn default() -> Self {
        let now = chrono::Utc::now();
        Self {
            user_id: String::new(),
            enabled_strategies: Vec::new(),
            notifications_enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}
