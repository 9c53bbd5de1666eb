//! Shared types for Strategy Scanner (C4, §4.4).

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::CoreResult;
use crate::price::PriceCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

/// A candidate trade surfaced by one strategy for one user. Strategies never
/// submit trades themselves; they only propose opportunities for the
/// Ranker (C5) to score.
#[derive(Debug, Clone)]
pub struct Opportunity {
    pub user_id: String,
    pub strategy_name: String,
    pub mint: String,
    pub action: TradeAction,
    /// Amount in lamports (or smallest token unit, for sells).
    pub amount: u64,
    pub expected_profit: f64,
    pub rationale: String,
}

/// Everything a strategy needs to scan one user in one cycle. Constructed
/// fresh per user per cycle by the scheduler (§4.8 step 3).
pub struct ScanContext {
    pub user_id: String,
    pub balance_lamports: u64,
    pub price_cache: Arc<PriceCache>,
}

/// A pluggable scanning strategy. Implementations must not block the
/// scheduler on a single slow or failing strategy (§4.4 P7: one strategy
/// erroring must not block others, or other users' scans).
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;
    async fn scan(&self, ctx: &ScanContext) -> CoreResult<Vec<Opportunity>>;
}
