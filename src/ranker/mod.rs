//! Opportunity Ranker (C5, §4.5): risk scoring and approval gate between the
//! Strategy Scanner and the Trade Queue.

pub mod stub;
pub mod types;

pub use stub::ApproveAllRanker;
pub use types::{RankedOpportunity, Ranker, RiskTier};
