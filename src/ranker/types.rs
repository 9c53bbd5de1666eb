//! Shared types for Opportunity Ranker (C5, §4.5).

use async_trait::async_trait;

use crate::core::CoreResult;
use crate::strategy::Opportunity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// An opportunity after risk scoring, with the ranker's approve/deny
/// decision attached. Only `approved` opportunities ever reach the Trade
/// Queue (§4.5).
#[derive(Debug, Clone)]
pub struct RankedOpportunity {
    pub opportunity: Opportunity,
    pub risk_tier: RiskTier,
    pub score: f64,
    pub approved: bool,
}

/// Scores and filters opportunities surfaced by the Strategy Scanner.
/// Pluggable so risk policy can evolve without touching the scanner or the
/// trade queue (§4.5).
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(&self, opportunities: Vec<Opportunity>) -> CoreResult<Vec<RankedOpportunity>>;
}
