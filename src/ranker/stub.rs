//! Deterministic ranker (§4.5: "a baseline implementation that approves
//! every opportunity at a flat risk tier, used until real risk scoring
//! exists"). Approves everything at `Medium` risk, scored by the
//! opportunity's own expected profit.

use async_trait::async_trait;

use crate::core::CoreResult;
use crate::strategy::Opportunity;

use super::types::{RankedOpportunity, Ranker, RiskTier};

pub struct ApproveAllRanker;

#[async_trait]
impl Ranker for ApproveAllRanker {
    async fn rank(&self, opportunities: Vec<Opportunity>) -> CoreResult<Vec<RankedOpportunity>> {
        Ok(opportunities
            .into_iter()
            .map(|opportunity| RankedOpportunity {
                score: opportunity.expected_profit,
                risk_tier: RiskTier::Medium,
                opportunity,
                approved: true,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::TradeAction;

    fn opp() -> Opportunity {
        Opportunity {
            user_id: "U1".to_string(),
            strategy_name: "stub".to_string(),
            mint: "MINT".to_string(),
            action: TradeAction::Buy,
            amount: 1_000,
            expected_profit: 0.5,
            rationale: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn approves_every_opportunity_at_medium_risk() {
        let ranked = ApproveAllRanker.rank(vec![opp()]).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].approved);
        assert_eq!(ranked[0].risk_tier, RiskTier::Medium);
    }
}
