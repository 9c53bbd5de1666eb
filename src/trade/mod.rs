//! Trade Queue (C6, §4.6): the single path from an approved opportunity to
//! an on-chain submission, its confirmation, and its ledger record.

pub mod executor;
pub mod queue;
pub mod solana_executor;

pub use executor::ChainExecutor;
pub use queue::{TradeQueue, TradeRequest};
pub use solana_executor::SolanaChainExecutor;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PerformanceLedger;
    use crate::notifier::LogNotifier;
    use crate::persistence::sqlite::SqlitePersistence;
    use crate::ranker::{RankedOpportunity, RiskTier};
    use crate::rpc::RpcGate;
    use crate::strategy::{Opportunity, TradeAction};
    use crate::wallet::{WalletHandle, WalletStore};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct RecordingExecutor {
        order: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChainExecutor for RecordingExecutor {
        async fn submit(&self, wallet: &WalletHandle, _opportunity: &RankedOpportunity) -> crate::core::CoreResult<String> {
            self.order.lock().unwrap().push(wallet.user_id.clone());
            Ok(format!("sig-{}", wallet.user_id))
        }

        async fn confirm(&self, _signature: &str) -> crate::core::CoreResult<bool> {
            Ok(true)
        }
    }

    fn sample_opportunity(user_id: &str) -> RankedOpportunity {
        RankedOpportunity {
            opportunity: Opportunity {
                user_id: user_id.to_string(),
                strategy_name: "stub".to_string(),
                mint: "MINT".to_string(),
                action: TradeAction::Buy,
                amount: 1_000,
                expected_profit: 0.25,
                rationale: "test".to_string(),
            },
            risk_tier: RiskTier::Medium,
            score: 0.25,
            approved: true,
        }
    }

    async fn setup_wallets(store: &WalletStore, users: &[&str]) {
        std::env::set_var("TRADING_CORE_MASTER_SECRET", "test-secret");
        for user in users {
            store.create_wallet(user).await.unwrap();
        }
    }

    #[tokio::test]
    async fn trades_for_different_users_execute_in_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", dir.path());
        let persistence = Arc::new(SqlitePersistence::open_in_memory().unwrap());
        let wallet_store = Arc::new(WalletStore::new(
            crate::config::WalletStoreConfig::default(),
            persistence.clone(),
        ));
        setup_wallets(&wallet_store, &["U1", "U2", "U3"]).await;

        let order = Arc::new(Mutex::new(Vec::new()));
        let executor = Arc::new(RecordingExecutor {
            order: order.clone(),
        });
        let ledger = Arc::new(PerformanceLedger::new(persistence));
        let notifier = Arc::new(LogNotifier);
        let rpc_gate = Arc::new(RpcGate::new(1000, 1000));

        let (queue, handle) = TradeQueue::spawn(
            executor,
            wallet_store,
            rpc_gate,
            ledger,
            notifier,
            16,
            Duration::from_secs(5),
        );

        for user in ["U1", "U2", "U3"] {
            queue
                .submit(TradeRequest {
                    user_id: user.to_string(),
                    opportunity: sample_opportunity(user),
                })
                .await
                .unwrap();
        }
        drop(queue);
        handle.await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["U1", "U2", "U3"]);
    }
}
