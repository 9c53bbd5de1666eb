//! Shared types for the Performance Ledger (C7, §4.6).

use std::collections::HashMap;

/// Per-user aggregate metrics (§3 Performance Metrics), recomputed from
/// Trade Records — this struct must always equal the aggregate of the
/// user's own records, never a separately maintained running total.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMetrics {
    pub user_id: String,
    pub total_trades: u64,
    pub successful_trades: u64,
    pub losing_trades: u64,
    pub win_rate: f64,
    pub total_profit: f64,
    pub best_trade: Option<f64>,
    pub worst_trade: Option<f64>,
    /// Total profit per strategy name.
    pub profit_by_strategy: HashMap<String, f64>,
}

/// One row of the anonymized public leaderboard. `label` is a pseudonym,
/// never the raw user ID (§4.6 P11).
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub label: String,
    pub total_profit: f64,
    pub trade_count: u64,
    pub win_count: u64,
}
