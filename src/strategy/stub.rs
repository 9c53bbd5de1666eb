//! A deterministic, test-only strategy (§4.4: "at least one strategy
//! implementation with no external dependency, used to validate the rest of
//! the pipeline without a live price source"). Proposes a fixed-size buy
//! whenever the user has a nonzero balance; never sells, never errors.

use async_trait::async_trait;

use crate::core::CoreResult;

use super::types::{Opportunity, ScanContext, Strategy, TradeAction};

pub struct StubStrategy {
    name: String,
    mint: String,
    buy_amount_lamports: u64,
}

impl StubStrategy {
    pub fn new(name: impl Into<String>, mint: impl Into<String>, buy_amount_lamports: u64) -> Self {
        Self {
            name: name.into(),
            mint: mint.into(),
            buy_amount_lamports,
        }
    }
}

#[async_trait]
impl Strategy for StubStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scan(&self, ctx: &ScanContext) -> CoreResult<Vec<Opportunity>> {
        if ctx.balance_lamports == 0 {
            return Ok(Vec::new());
        }
        let amount = self.buy_amount_lamports.min(ctx.balance_lamports);
        Ok(vec![Opportunity {
            user_id: ctx.user_id.clone(),
            strategy_name: self.name.clone(),
            mint: self.mint.clone(),
            action: TradeAction::Buy,
            amount,
            expected_profit: 0.0,
            rationale: "deterministic stub opportunity".to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::{PriceCache, PriceFetcher};
    use std::sync::Arc;

    struct NoopFetcher;
    #[async_trait]
    impl PriceFetcher for NoopFetcher {
        async fn fetch_price(&self, _mint: &str) -> CoreResult<f64> {
            Ok(1.0)
        }
    }

    fn ctx(balance: u64) -> ScanContext {
        ScanContext {
            user_id: "U1".to_string(),
            balance_lamports: balance,
            price_cache: Arc::new(PriceCache::new(Arc::new(NoopFetcher), 60)),
        }
    }

    #[tokio::test]
    async fn proposes_nothing_for_a_zero_balance_user() {
        let strategy = StubStrategy::new("stub", "MINT", 1_000);
        assert!(strategy.scan(&ctx(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn caps_the_buy_at_the_available_balance() {
        let strategy = StubStrategy::new("stub", "MINT", 1_000);
        let opportunities = strategy.scan(&ctx(500)).await.unwrap();
        assert_eq!(opportunities[0].amount, 500);
    }
}
