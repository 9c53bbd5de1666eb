//! Chain-facing seam for balance reads. Kept separate from `oracle.rs` so
//! the oracle's caching/batching/fallback logic can be tested against a
//! fake reader instead of a live RPC endpoint.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::core::{CoreError, CoreResult};

#[async_trait]
pub trait ChainBalanceReader: Send + Sync {
    async fn get_balance(&self, pubkey: &str) -> CoreResult<u64>;

    /// Best-effort batch read. Implementations may simply loop; the point of
    /// the seam is that the Balance Oracle only ever issues one logical call
    /// per batch through the rate gate (§4.8 "balances are fetched via batched
    /// RPC calls sized `rpcBatchSize`").
    async fn get_balances(&self, pubkeys: &[String]) -> CoreResult<Vec<CoreResult<u64>>>;
}

/// Production reader backed by a live Solana RPC endpoint.
pub struct SolanaRpcBalanceReader {
    client: RpcClient,
}

impl SolanaRpcBalanceReader {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: RpcClient::new(rpc_url),
        }
    }
}

fn parse_pubkey(s: &str) -> CoreResult<Pubkey> {
    Pubkey::from_str(s).map_err(|_| CoreError::InvalidInput {
        reason: format!("{s} is not a valid Solana public key"),
    })
}

fn classify_rpc_error(err: solana_client::client_error::ClientError) -> CoreError {
    CoreError::TransientRpc(err.to_string())
}

#[async_trait]
impl ChainBalanceReader for SolanaRpcBalanceReader {
    async fn get_balance(&self, pubkey: &str) -> CoreResult<u64> {
        let pubkey = parse_pubkey(pubkey)?;
        self.client
            .get_balance(&pubkey)
            .await
            .map_err(classify_rpc_error)
    }

    async fn get_balances(&self, pubkeys: &[String]) -> CoreResult<Vec<CoreResult<u64>>> {
        let mut out = Vec::with_capacity(pubkeys.len());
        for pk in pubkeys {
            out.push(self.get_balance(pk).await);
        }
        Ok(out)
    }
}
