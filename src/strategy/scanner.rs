//! Fan-out across every configured strategy for one user, isolating each
//! strategy's failures from the others (§4.4 P7).

use std::sync::Arc;

use crate::logger::{self, LogTag};

use super::types::{Opportunity, ScanContext, Strategy};

pub struct Scanner {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl Scanner {
    pub fn new(strategies: Vec<Arc<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Runs every strategy against `ctx`, collecting whatever opportunities
    /// survive. A strategy that errors is logged and skipped; it never
    /// aborts the scan for the other strategies or the calling user.
    pub async fn scan_user(&self, ctx: &ScanContext) -> Vec<Opportunity> {
        let mut opportunities = Vec::new();
        for strategy in &self.strategies {
            match strategy.scan(ctx).await {
                Ok(found) => opportunities.extend(found),
                Err(err) => {
                    logger::warning(
                        LogTag::Scanner,
                        &format!(
                            "strategy {} failed for user {}: {err}",
                            strategy.name(),
                            ctx.user_id
                        ),
                    );
                }
            }
        }
        opportunities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoreResult;
    use crate::price::{PriceCache, PriceFetcher};
    use async_trait::async_trait;

    struct FailingStrategy;
    #[async_trait]
    impl Strategy for FailingStrategy {
        fn name(&self) -> &str {
            "failing"
        }
        async fn scan(&self, _ctx: &ScanContext) -> CoreResult<Vec<Opportunity>> {
            Err(crate::core::CoreError::StrategyError {
                strategy: "failing".to_string(),
                user_id: "U1".to_string(),
                reason: "simulated failure".to_string(),
            })
        }
    }

    struct FixedStrategy;
    #[async_trait]
    impl Strategy for FixedStrategy {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn scan(&self, ctx: &ScanContext) -> CoreResult<Vec<Opportunity>> {
            Ok(vec![Opportunity {
                user_id: ctx.user_id.clone(),
                strategy_name: "fixed".to_string(),
                mint: "MINT".to_string(),
                action: super::super::types::TradeAction::Buy,
                amount: 1_000,
                expected_profit: 0.1,
                rationale: "fixed".to_string(),
            }])
        }
    }

    struct NoopFetcher;
    #[async_trait]
    impl PriceFetcher for NoopFetcher {
        async fn fetch_price(&self, _mint: &str) -> CoreResult<f64> {
            Ok(1.0)
        }
    }

    #[tokio::test]
    async fn a_failing_strategy_does_not_block_the_others() {
        let scanner = Scanner::new(vec![Arc::new(FailingStrategy), Arc::new(FixedStrategy)]);
        let ctx = ScanContext {
            user_id: "U1".to_string(),
            balance_lamports: 1_000_000,
            price_cache: Arc::new(PriceCache::new(Arc::new(NoopFetcher), 60)),
        };
        let opportunities = scanner.scan_user(&ctx).await;
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].strategy_name, "fixed");
    }
}
