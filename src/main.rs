//! Composition root: loads configuration, wires every component together
//! with explicit dependency injection, and runs the scheduler as a
//! long-lived service until Ctrl-C requests a graceful shutdown (§5).

use std::sync::Arc;
use std::time::Duration;

use trading_core::api::TradingCoreApi;
use trading_core::balance::{BalanceOracle, SolanaRpcBalanceReader};
use trading_core::config::Config;
use trading_core::core::CoreError;
use trading_core::ledger::PerformanceLedger;
use trading_core::logger::{self, LogTag};
use trading_core::notifier::{LogNotifier, Notifier};
#[cfg(feature = "telegram")]
use trading_core::notifier::TelegramNotifier;
use trading_core::paths;
use trading_core::persistence::sqlite::SqlitePersistence;
use trading_core::persistence::Persistence;
use trading_core::price::PriceCache;
use trading_core::ranker::ApproveAllRanker;
use trading_core::rpc::RpcGate;
use trading_core::scheduler::Scheduler;
use trading_core::strategy::{Scanner, StubStrategy};
use trading_core::trade::{SolanaChainExecutor, TradeQueue};
use trading_core::wallet::WalletStore;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    logger::init(&args);

    if let Err(err) = run(&args).await {
        logger::error(LogTag::System, &format!("fatal startup error: {err}"));
        std::process::exit(1);
    }
}

async fn run(_args: &[String]) -> Result<(), CoreError> {
    paths::ensure_all_directories()
        .map_err(CoreError::Fatal)?;

    let config = Config::load(&paths::get_config_path())?;
    logger::info(LogTag::System, "configuration loaded");

    let persistence: Arc<dyn Persistence> = Arc::new(
        SqlitePersistence::open(&paths::get_database_path().display().to_string())
            .map_err(|e| CoreError::Fatal(format!("failed to open database: {e}")))?,
    );

    let wallet_store = Arc::new(WalletStore::new(config.wallet_store.clone(), persistence.clone()));
    let rpc_gate = Arc::new(RpcGate::new(config.rate_limit.sustained, config.rate_limit.burst));

    let balance_reader = Arc::new(SolanaRpcBalanceReader::new(config.chain.rpc_url.clone()));
    let balance_oracle = Arc::new(BalanceOracle::new(
        balance_reader,
        rpc_gate.clone(),
        config.cache.balance_cache_ttl_secs,
        config.scheduler.rpc_batch_size,
    ));

    let price_fetcher = Arc::new(trading_core::price::JupiterPriceFetcher::new());
    let price_cache = Arc::new(PriceCache::new(price_fetcher, config.cache.price_cache_ttl_secs));

    let scanner = Arc::new(Scanner::new(vec![Arc::new(StubStrategy::new(
        "baseline-accumulator",
        trading_core::constants::SOL_MINT,
        config.scheduler.min_trading_balance,
    ))]));
    let ranker = Arc::new(ApproveAllRanker);

    let ledger = Arc::new(PerformanceLedger::new(persistence.clone()));

    let notifier: Arc<dyn Notifier> = build_notifier(&config);

    let executor = Arc::new(SolanaChainExecutor::new(config.chain.rpc_url.clone()));
    let (trade_queue, trade_queue_handle) = TradeQueue::spawn(
        executor,
        wallet_store.clone(),
        rpc_gate.clone(),
        ledger.clone(),
        notifier.clone(),
        config.scheduler.trade_queue_capacity,
        Duration::from_secs(config.trade.confirmation_timeout_secs),
    );
    let trade_queue = Arc::new(trade_queue);

    let scheduler = Arc::new(Scheduler::new(
        config.scheduler.clone(),
        wallet_store.clone(),
        balance_oracle.clone(),
        scanner,
        ranker,
        trade_queue,
        notifier.clone(),
        rpc_gate,
        price_cache,
    ));

    let _api = Arc::new(TradingCoreApi::new(
        wallet_store,
        balance_oracle,
        ledger,
        notifier,
    ));

    let shutdown = scheduler.shutdown_handle();
    let scheduler_task = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    logger::info(LogTag::System, "trading core running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CoreError::Fatal(format!("failed to listen for Ctrl-C: {e}")))?;

    logger::info(LogTag::System, "shutdown requested, draining");
    shutdown.notify_waiters();
    let _ = scheduler_task.await;
    drop(scheduler);
    let _ = trade_queue_handle.await;

    logger::info(LogTag::System, "shutdown complete");
    logger::flush();
    Ok(())
}

fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    #[cfg(feature = "telegram")]
    if config.telegram.enabled {
        if let Ok(chat_id) = config.telegram.chat_id.parse::<i64>() {
            return Arc::new(TelegramNotifier::new(&config.telegram.bot_token, chat_id));
        }
        logger::warning(
            LogTag::Notifier,
            "telegram.enabled is true but telegram.chat_id is not a valid integer; falling back to log notifier",
        );
    }
    Arc::new(LogNotifier)
}
