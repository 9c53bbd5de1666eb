//! Chain-facing seam for trade submission, mirroring `balance::reader` and
//! `price::fetcher`. Kept separate so the queue's ordering/isolation/timeout
//! logic can be tested against a fake executor.

use async_trait::async_trait;

use crate::core::CoreResult;
use crate::ranker::RankedOpportunity;
use crate::wallet::WalletHandle;

/// Submits and confirms one trade on-chain. The Trade Queue is the only
/// caller; wallet signing capability never leaves this boundary (§4.1,
/// §4.6 P9: "only the Trade Queue ever borrows a user's signer").
#[async_trait]
pub trait ChainExecutor: Send + Sync {
    /// Builds, signs, and submits the transaction for `opportunity`,
    /// returning its signature once broadcast (not yet confirmed).
    async fn submit(&self, wallet: &WalletHandle, opportunity: &RankedOpportunity) -> CoreResult<String>;

    /// Polls for confirmation of a previously submitted signature.
    async fn confirm(&self, signature: &str) -> CoreResult<bool>;
}
