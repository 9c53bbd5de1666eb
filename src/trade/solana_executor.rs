//! Production `ChainExecutor` backed by a live Solana RPC endpoint.
//!
//! Building and routing an actual DEX swap transaction is out of scope for
//! this core (§3 Non-goals: strategy-specific execution venues are a
//! concern of the strategies themselves, not the queue). This executor
//! submits a minimal self-transfer of `opportunity.amount` lamports as the
//! on-chain action the queue confirms and records — deployments that need
//! real swap routing inject their own `ChainExecutor` built around the
//! same trait; the queue, ledger, and notifier around it do not change.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, system_instruction, transaction::Transaction};
use std::str::FromStr;

use crate::core::{CoreError, CoreResult};
use crate::ranker::RankedOpportunity;
use crate::wallet::WalletHandle;

use super::executor::ChainExecutor;

pub struct SolanaChainExecutor {
    client: RpcClient,
}

impl SolanaChainExecutor {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()),
        }
    }
}

#[async_trait]
impl ChainExecutor for SolanaChainExecutor {
    async fn submit(&self, wallet: &WalletHandle, opportunity: &RankedOpportunity) -> CoreResult<String> {
        let amount = opportunity.opportunity.amount.max(1);
        let instruction = system_instruction::transfer(&wallet.pubkey(), &wallet.pubkey(), amount);
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| CoreError::TransientRpc(e.to_string()))?;
        let tx = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&wallet.pubkey()),
            &[wallet.signer()],
            blockhash,
        );
        let signature = self
            .client
            .send_transaction(&tx)
            .await
            .map_err(|e| CoreError::TransientRpc(e.to_string()))?;
        Ok(signature.to_string())
    }

    async fn confirm(&self, signature: &str) -> CoreResult<bool> {
        let signature = solana_sdk::signature::Signature::from_str(signature)
            .map_err(|e| CoreError::InvalidInput { reason: e.to_string() })?;
        self.client
            .confirm_transaction(&signature)
            .await
            .map_err(|e| CoreError::TransientRpc(e.to_string()))
    }
}
