//! The external command surface (§6 `CoreApi`): every operation a host
//! application (Telegram bot, HTTP handler, CLI) can perform on behalf of a
//! user. This is the one place that composes the Secure Wallet Store,
//! Balance Oracle, and Performance Ledger for direct, non-scheduled access;
//! the scheduler (C8) drives the autonomous scan/trade cycle separately.

use std::sync::Arc;

use async_trait::async_trait;

use crate::balance::BalanceOracle;
use crate::core::CoreResult;
use crate::ledger::{LeaderboardEntry, PerformanceLedger, UserMetrics};
use crate::notifier::{NotificationEvent, Notifier};
use crate::wallet::{ExportedKey, WalletStore, WalletSummary};

#[async_trait]
pub trait CoreApi: Send + Sync {
    async fn create_wallet(&self, user_id: &str) -> CoreResult<WalletSummary>;
    async fn import_wallet(&self, user_id: &str, mnemonic: &str) -> CoreResult<WalletSummary>;
    /// `caller_id` must equal `user_id`, enforced by the wallet store
    /// (§4.10 P8: only the owning user may ever export their own key).
    async fn export_key(&self, caller_id: &str, user_id: &str) -> CoreResult<ExportedKey>;
    async fn get_balance(&self, user_id: &str) -> CoreResult<u64>;
    async fn get_wallet_address(&self, user_id: &str) -> CoreResult<String>;
    async fn get_metrics(&self, user_id: &str) -> CoreResult<UserMetrics>;
    async fn get_leaderboard(&self, limit: usize) -> CoreResult<Vec<LeaderboardEntry>>;
}

pub struct TradingCoreApi {
    wallet_store: Arc<WalletStore>,
    balance_oracle: Arc<BalanceOracle>,
    ledger: Arc<PerformanceLedger>,
    notifier: Arc<dyn Notifier>,
}

impl TradingCoreApi {
    pub fn new(
        wallet_store: Arc<WalletStore>,
        balance_oracle: Arc<BalanceOracle>,
        ledger: Arc<PerformanceLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            wallet_store,
            balance_oracle,
            ledger,
            notifier,
        }
    }
}

#[async_trait]
impl CoreApi for TradingCoreApi {
    async fn create_wallet(&self, user_id: &str) -> CoreResult<WalletSummary> {
        let summary = self.wallet_store.create_wallet(user_id).await?;
        let _ = self
            .notifier
            .notify(
                user_id,
                NotificationEvent::WalletCreated,
                &format!("wallet created: {}", summary.public_key),
            )
            .await;
        Ok(summary)
    }

    async fn import_wallet(&self, user_id: &str, mnemonic: &str) -> CoreResult<WalletSummary> {
        let summary = self.wallet_store.import_wallet(user_id, mnemonic).await?;
        let _ = self
            .notifier
            .notify(
                user_id,
                NotificationEvent::WalletCreated,
                &format!("wallet imported: {}", summary.public_key),
            )
            .await;
        Ok(summary)
    }

    async fn export_key(&self, caller_id: &str, user_id: &str) -> CoreResult<ExportedKey> {
        self.wallet_store.export_key(caller_id, user_id).await
    }

    async fn get_balance(&self, user_id: &str) -> CoreResult<u64> {
        let public_key = self.wallet_store.get_public_key(user_id).await?;
        self.balance_oracle.get_balance(&public_key).await
    }

    async fn get_wallet_address(&self, user_id: &str) -> CoreResult<String> {
        self.wallet_store.get_public_key(user_id).await
    }

    async fn get_metrics(&self, user_id: &str) -> CoreResult<UserMetrics> {
        // A user with no wallet is not provisioned at all, which must read
        // as `NotFound` rather than an all-zero metrics row (scenario 1:
        // `getMetrics` for a nonexistent user raises `NotFound`).
        self.wallet_store.get_public_key(user_id).await?;
        self.ledger.get_metrics(user_id).await
    }

    async fn get_leaderboard(&self, limit: usize) -> CoreResult<Vec<LeaderboardEntry>> {
        self.ledger.get_leaderboard(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::reader::ChainBalanceReader;
    use crate::notifier::LogNotifier;
    use crate::persistence::sqlite::SqlitePersistence;
    use crate::rpc::RpcGate;

    struct FixedReader;
    #[async_trait]
    impl ChainBalanceReader for FixedReader {
        async fn get_balance(&self, _pubkey: &str) -> CoreResult<u64> {
            Ok(42_000_000_000)
        }
        async fn get_balances(&self, pubkeys: &[String]) -> CoreResult<Vec<CoreResult<u64>>> {
            Ok(pubkeys.iter().map(|_| Ok(42_000_000_000)).collect())
        }
    }

    fn build_api() -> (TradingCoreApi, tempfile::TempDir) {
        std::env::set_var("TRADING_CORE_MASTER_SECRET", "test-secret");
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", dir.path());
        let persistence = Arc::new(SqlitePersistence::open_in_memory().unwrap());
        let wallet_store = Arc::new(WalletStore::new(
            crate::config::WalletStoreConfig::default(),
            persistence.clone(),
        ));
        let balance_oracle = Arc::new(BalanceOracle::new(
            Arc::new(FixedReader),
            Arc::new(RpcGate::new(100, 100)),
            10,
            10,
        ));
        let ledger = Arc::new(PerformanceLedger::new(persistence));
        let api = TradingCoreApi::new(wallet_store, balance_oracle, ledger, Arc::new(LogNotifier));
        (api, dir)
    }

    #[tokio::test]
    async fn create_wallet_then_get_balance_uses_the_new_address() {
        let (api, _dir) = build_api();
        api.create_wallet("U1").await.unwrap();
        assert_eq!(api.get_balance("U1").await.unwrap(), 42_000_000_000);
    }

    #[tokio::test]
    async fn export_key_denies_a_different_caller() {
        let (api, _dir) = build_api();
        api.create_wallet("U1").await.unwrap();
        let err = api.export_key("U2", "U1").await.unwrap_err();
        assert!(matches!(err, crate::core::CoreError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn metrics_for_a_brand_new_user_are_empty_not_an_error() {
        let (api, _dir) = build_api();
        api.create_wallet("U1").await.unwrap();
        let metrics = api.get_metrics("U1").await.unwrap();
        assert_eq!(metrics.total_trades, 0);
    }
}
