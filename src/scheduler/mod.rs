//! User Scheduler (C8, §4.8): the control core that drives every tenant's
//! scan/trade cycle. One scheduler instance owns the whole population —
//! there is no per-user task, only a per-user slice of each shared cycle.

pub mod state;

pub use state::SchedulerState;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify, RwLock, Semaphore};

use crate::balance::BalanceOracle;
use crate::config::SchedulerConfig;
use crate::core::UserId;
use crate::logger::{self, LogTag};
use crate::notifier::{NotificationEvent, Notifier};
use crate::ranker::Ranker;
use crate::rpc::RpcGate;
use crate::strategy::{ScanContext, Scanner};
use crate::trade::{TradeQueue, TradeRequest};
use crate::wallet::WalletStore;

/// Drives the scan → rank → enqueue cycle for every registered user on a
/// shared, possibly-staggered interval (§4.8).
pub struct Scheduler {
    config: SchedulerConfig,
    wallet_store: Arc<WalletStore>,
    balance_oracle: Arc<BalanceOracle>,
    scanner: Arc<Scanner>,
    ranker: Arc<dyn Ranker>,
    trade_queue: Arc<TradeQueue>,
    notifier: Arc<dyn Notifier>,
    rpc_gate: Arc<RpcGate>,
    price_cache: Arc<crate::price::PriceCache>,
    state: RwLock<SchedulerState>,
    last_balance: Mutex<HashMap<UserId, u64>>,
    empty_cycles: AtomicU32,
    shutdown: Arc<Notify>,
}

impl Scheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SchedulerConfig,
        wallet_store: Arc<WalletStore>,
        balance_oracle: Arc<BalanceOracle>,
        scanner: Arc<Scanner>,
        ranker: Arc<dyn Ranker>,
        trade_queue: Arc<TradeQueue>,
        notifier: Arc<dyn Notifier>,
        rpc_gate: Arc<RpcGate>,
        price_cache: Arc<crate::price::PriceCache>,
    ) -> Self {
        Self {
            config,
            wallet_store,
            balance_oracle,
            scanner,
            ranker,
            trade_queue,
            notifier,
            rpc_gate,
            price_cache,
            state: RwLock::new(SchedulerState::Stopped),
            last_balance: Mutex::new(HashMap::new()),
            empty_cycles: AtomicU32::new(0),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }

    /// Signal used for graceful shutdown (§5): the caller holds this and
    /// calls `notify_waiters` from its Ctrl-C handler; `run` observes it
    /// between cycles and during the staggered sleep.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Runs cycles until `shutdown_handle()` is notified. Intended to be
    /// spawned as its own task from the composition root.
    pub async fn run(&self) {
        *self.state.write().await = SchedulerState::Running;
        logger::info(LogTag::Scheduler, "scheduler started");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => break,
                _ = self.run_cycle() => {}
            }

            let interval = self.next_interval();
            tokio::select! {
                _ = self.shutdown.notified() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        *self.state.write().await = SchedulerState::Draining;
        logger::info(LogTag::Scheduler, "scheduler draining");
        *self.state.write().await = SchedulerState::Stopped;
    }

    fn next_interval(&self) -> Duration {
        let mut secs = self.config.scan_interval_secs as f64;
        if self.rpc_gate.take_rate_limited_signal() {
            secs *= 1.0 + self.config.rate_limit_backoff.max(0.0);
            logger::warning(
                LogTag::Scheduler,
                &format!("rate limit observed last cycle, widening interval to {secs:.0}s"),
            );
        }
        if self.empty_cycles.load(Ordering::SeqCst) >= self.config.empty_scan_threshold {
            secs += self.config.empty_scan_extra_secs as f64;
        }
        Duration::from_secs_f64(secs.max(1.0))
    }

    async fn run_cycle(&self) {
        let user_ids = match self.wallet_store.list_user_ids().await {
            Ok(ids) => ids,
            Err(err) => {
                logger::error(LogTag::Scheduler, &format!("failed to list users: {err}"));
                return;
            }
        };
        if user_ids.is_empty() {
            return;
        }

        if user_ids.len() > self.config.stagger_threshold_users {
            self.staggered_cycle(&user_ids).await;
        } else {
            self.scan_and_trade_batch(&user_ids).await;
        }
    }

    /// Spreads scan start times for a large population across the
    /// configured window instead of issuing every balance/scan call at
    /// once (§4.8: "staggering avoids a thundering herd against the RPC
    /// gate when the population is large").
    async fn staggered_cycle(&self, user_ids: &[UserId]) {
        let window = Duration::from_secs(self.config.stagger_window_secs.max(1));
        let chunk_count = (self.config.stagger_threshold_users / 4).max(1);
        let chunks: Vec<&[UserId]> = user_ids.chunks(chunk_count.max(1)).collect();
        let delay_per_chunk = window / (chunks.len() as u32).max(1);

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = self.shutdown.notified() => return,
                    _ = tokio::time::sleep(delay_per_chunk) => {}
                }
            }
            self.scan_and_trade_batch(chunk).await;
        }
    }

    async fn scan_and_trade_batch(&self, user_ids: &[UserId]) {
        let mut found_any = false;

        for batch in user_ids.chunks(self.config.rpc_batch_size.max(1)) {
            let mut pubkeys = Vec::with_capacity(batch.len());
            for user_id in batch {
                match self.wallet_store.get_public_key(user_id).await {
                    Ok(pk) => pubkeys.push(pk),
                    Err(err) => {
                        logger::warning(
                            LogTag::Scheduler,
                            &format!("skipping user {user_id}, no wallet: {err}"),
                        );
                        pubkeys.push(String::new());
                    }
                }
            }

            let balances = self.balance_oracle.batch_get_balances(&pubkeys).await;
            let fanout = Arc::new(Semaphore::new(self.config.balance_fanout_concurrency.max(1)));
            let scan_limit = Arc::new(Semaphore::new(self.config.scan_concurrency.max(1)));

            // Scans run concurrently under the bounded pools above (they
            // only read shared caches), but §5(ii) requires enqueue order to
            // follow scheduler iteration order across users. So each task
            // returns its ranked opportunities instead of enqueuing them
            // directly, and this loop submits them to the trade queue
            // sequentially afterward, in the same order `batch` lists users.
            let mut tasks = Vec::new();
            for (user_id, (_, balance_result)) in batch.iter().zip(balances.into_iter()) {
                let user_id = user_id.clone();
                let balance = match balance_result {
                    Ok(b) => b,
                    Err(err) => {
                        logger::warning(
                            LogTag::Scheduler,
                            &format!("balance read failed for {user_id}: {err}"),
                        );
                        continue;
                    }
                };

                self.check_threshold_crossing(&user_id, balance).await;

                if balance < self.config.min_trading_balance {
                    continue;
                }

                let fanout = fanout.clone();
                let scan_limit = scan_limit.clone();
                let scanner = self.scanner.clone();
                let ranker = self.ranker.clone();
                let price_cache = self.price_cache.clone();

                tasks.push((
                    user_id.clone(),
                    tokio::spawn(async move {
                        let _fanout_permit =
                            fanout.acquire().await.expect("fanout semaphore never closes");
                        let _scan_permit =
                            scan_limit.acquire().await.expect("scan semaphore never closes");
                        let ctx = ScanContext {
                            user_id: user_id.clone(),
                            balance_lamports: balance,
                            price_cache,
                        };
                        let opportunities = scanner.scan_user(&ctx).await;
                        if opportunities.is_empty() {
                            return Vec::new();
                        }
                        match ranker.rank(opportunities).await {
                            Ok(ranked) => ranked.into_iter().filter(|o| o.approved).collect(),
                            Err(err) => {
                                logger::warning(
                                    LogTag::Scheduler,
                                    &format!("ranking failed for {user_id}: {err}"),
                                );
                                Vec::new()
                            }
                        }
                    }),
                ));
            }

            for (user_id, task) in tasks {
                let ranked = task.await.unwrap_or_default();
                for opportunity in ranked {
                    found_any = true;
                    if self
                        .trade_queue
                        .submit(TradeRequest {
                            user_id: user_id.clone(),
                            opportunity,
                        })
                        .await
                        .is_err()
                    {
                        logger::error(
                            LogTag::Scheduler,
                            &format!("trade queue closed while enqueuing for {user_id}"),
                        );
                        break;
                    }
                }
            }
        }

        if found_any {
            self.empty_cycles.store(0, Ordering::SeqCst);
        } else {
            self.empty_cycles.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn check_threshold_crossing(&self, user_id: &str, balance: u64) {
        let threshold = self.config.min_trading_balance;
        let mut last = self.last_balance.lock().await;
        let previous = last.insert(user_id.to_string(), balance);
        if let Some(previous) = previous {
            let crossed_up = previous < threshold && balance >= threshold;
            let crossed_down = previous >= threshold && balance < threshold;
            if crossed_up {
                let _ = self
                    .notifier
                    .notify(
                        user_id,
                        NotificationEvent::Activated,
                        "balance crossed above the trading threshold",
                    )
                    .await;
            } else if crossed_down {
                let _ = self
                    .notifier
                    .notify(
                        user_id,
                        NotificationEvent::Deactivated,
                        "balance dropped below the trading threshold",
                    )
                    .await;
            }
        }
    }
}
