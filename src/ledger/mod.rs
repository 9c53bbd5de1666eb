//! Performance Ledger (C7, §4.6): records every trade attempt and serves
//! per-user metrics plus an anonymized leaderboard.

pub mod anonymize;
pub mod types;

pub use types::{LeaderboardEntry, UserMetrics};

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheConfig as CacheManagerConfig, CacheManager};
use crate::core::CoreResult;
use crate::persistence::{Persistence, TradeOutcome, TradeRow};

const LEADERBOARD_CACHE_TTL_SECS: u64 = 30;

pub struct PerformanceLedger {
    persistence: Arc<dyn Persistence>,
    leaderboard_cache: CacheManager<usize, Vec<LeaderboardEntry>>,
}

impl PerformanceLedger {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            persistence,
            leaderboard_cache: CacheManager::new(CacheManagerConfig::custom(
                LEADERBOARD_CACHE_TTL_SECS,
                32,
            )),
        }
    }

    /// Appends one trade attempt (success, failure, or timeout alike — the
    /// ledger records attempts, not just wins) and invalidates the
    /// leaderboard cache so the next read reflects it.
    pub async fn record_trade(&self, row: &TradeRow) -> CoreResult<()> {
        self.persistence.append_trade(row).await?;
        self.leaderboard_cache.clear();
        Ok(())
    }

    /// Per-user metrics, always filtered by `user_id` at the persistence
    /// layer (§4.7 P10: no other user's trades are ever visible here).
    pub async fn get_metrics(&self, user_id: &str) -> CoreResult<UserMetrics> {
        let trades = self.persistence.trades_for_user(user_id).await?;
        let total_trades = trades.len() as u64;
        let successful_trades = trades
            .iter()
            .filter(|t| t.outcome == TradeOutcome::Success)
            .count() as u64;
        let winning_trades = trades.iter().filter(|t| t.profit > 0.0).count() as u64;
        let losing_trades = trades.iter().filter(|t| t.profit < 0.0).count() as u64;
        let win_rate = if total_trades == 0 {
            0.0
        } else {
            winning_trades as f64 / total_trades as f64
        };
        let total_profit = trades.iter().map(|t| t.profit).sum();
        let best_trade = trades
            .iter()
            .map(|t| t.profit)
            .fold(None, |acc: Option<f64>, p| {
                Some(acc.map_or(p, |best| best.max(p)))
            });
        let worst_trade = trades
            .iter()
            .map(|t| t.profit)
            .fold(None, |acc: Option<f64>, p| {
                Some(acc.map_or(p, |worst| worst.min(p)))
            });
        let mut profit_by_strategy: HashMap<String, f64> = HashMap::new();
        for t in &trades {
            *profit_by_strategy.entry(t.strategy_name.clone()).or_insert(0.0) += t.profit;
        }
        Ok(UserMetrics {
            user_id: user_id.to_string(),
            total_trades,
            successful_trades,
            losing_trades,
            win_rate,
            total_profit,
            best_trade,
            worst_trade,
            profit_by_strategy,
        })
    }

    /// Top-`limit` users by total profit, anonymized (§4.6 P11).
    pub async fn get_leaderboard(&self, limit: usize) -> CoreResult<Vec<LeaderboardEntry>> {
        if let Some(cached) = self.leaderboard_cache.get(&limit) {
            return Ok(cached);
        }

        let rows = self.persistence.leaderboard(limit).await?;
        let entries: Vec<LeaderboardEntry> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (user_id, total_profit, trade_count, win_count))| LeaderboardEntry {
                rank: i + 1,
                label: anonymize::anonymize(&user_id),
                total_profit,
                trade_count,
                win_count,
            })
            .collect();

        self.leaderboard_cache.insert(limit, entries.clone());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::SqlitePersistence;
    use chrono::Utc;

    fn trade(user_id: &str, profit: f64, outcome: TradeOutcome) -> TradeRow {
        TradeRow {
            trade_id: 0,
            user_id: user_id.to_string(),
            strategy_name: "stub".to_string(),
            action: "buy".to_string(),
            amount: 1_000,
            profit,
            tx_signature: Some("sig".to_string()),
            outcome,
            timestamp: Utc::now(),
            details: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn metrics_are_scoped_to_one_user() {
        let persistence = Arc::new(SqlitePersistence::open_in_memory().unwrap());
        let ledger = PerformanceLedger::new(persistence);
        ledger
            .record_trade(&trade("U1", 1.0, TradeOutcome::Success))
            .await
            .unwrap();
        ledger
            .record_trade(&trade("U2", 100.0, TradeOutcome::Success))
            .await
            .unwrap();

        let metrics = ledger.get_metrics("U1").await.unwrap();
        assert_eq!(metrics.total_trades, 1);
        assert_eq!(metrics.total_profit, 1.0);
    }

    #[tokio::test]
    async fn metrics_compute_win_rate_extremes_and_per_strategy_breakdown() {
        let persistence = Arc::new(SqlitePersistence::open_in_memory().unwrap());
        let ledger = PerformanceLedger::new(persistence);

        let mut winner = trade("U1", 3.0, TradeOutcome::Success);
        winner.strategy_name = "alpha".to_string();
        ledger.record_trade(&winner).await.unwrap();

        let mut loser = trade("U1", -1.0, TradeOutcome::Success);
        loser.strategy_name = "alpha".to_string();
        ledger.record_trade(&loser).await.unwrap();

        let mut other_strategy = trade("U1", 2.0, TradeOutcome::Success);
        other_strategy.strategy_name = "beta".to_string();
        ledger.record_trade(&other_strategy).await.unwrap();

        let failed = trade("U1", 0.0, TradeOutcome::Failed);
        ledger.record_trade(&failed).await.unwrap();

        let metrics = ledger.get_metrics("U1").await.unwrap();
        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.losing_trades, 1);
        assert_eq!(metrics.win_rate, 2.0 / 4.0);
        assert_eq!(metrics.best_trade, Some(3.0));
        assert_eq!(metrics.worst_trade, Some(-1.0));
        assert_eq!(metrics.profit_by_strategy.get("alpha"), Some(&2.0));
        assert_eq!(metrics.profit_by_strategy.get("beta"), Some(&2.0));
    }

    #[tokio::test]
    async fn leaderboard_entries_never_carry_the_raw_user_id() {
        let persistence = Arc::new(SqlitePersistence::open_in_memory().unwrap());
        let ledger = PerformanceLedger::new(persistence);
        ledger
            .record_trade(&trade("U1", 5.0, TradeOutcome::Success))
            .await
            .unwrap();

        let board = ledger.get_leaderboard(10).await.unwrap();
        assert_eq!(board.len(), 1);
        assert!(!board[0].label.contains("U1"));
    }

    #[tokio::test]
    async fn a_new_record_invalidates_the_cached_leaderboard() {
        let persistence = Arc::new(SqlitePersistence::open_in_memory().unwrap());
        let ledger = PerformanceLedger::new(persistence);
        ledger
            .record_trade(&trade("U1", 5.0, TradeOutcome::Success))
            .await
            .unwrap();
        assert_eq!(ledger.get_leaderboard(10).await.unwrap().len(), 1);

        ledger
            .record_trade(&trade("U2", 1.0, TradeOutcome::Success))
            .await
            .unwrap();
        assert_eq!(ledger.get_leaderboard(10).await.unwrap().len(), 2);
    }
}
