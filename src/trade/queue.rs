//! Trade Queue (C6, §4.6).
//!
//! A single consumer task drains a bounded channel in strict FIFO order
//! (§4.6 P9: "trades for the same user must execute in the order they were
//! queued, and queue order is never reordered by priority or retries"), so
//! no producer-side concurrency can interleave two trades for one user.
//! Each request is processed independently — one user's failure or timeout
//! never blocks or drops another's (§4.6 P7 error isolation).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::CoreError;
use crate::ledger::PerformanceLedger;
use crate::logger::{self, LogTag};
use crate::notifier::{NotificationEvent, Notifier};
use crate::persistence::{TradeOutcome, TradeRow};
use crate::ranker::RankedOpportunity;
use crate::rpc::RpcGate;
use crate::wallet::WalletStore;

use super::executor::ChainExecutor;

/// One approved opportunity, queued for execution.
pub struct TradeRequest {
    pub user_id: String,
    pub opportunity: RankedOpportunity,
}

pub struct TradeQueue {
    sender: mpsc::Sender<TradeRequest>,
}

impl TradeQueue {
    /// Spawns the single consumer task and returns a handle to submit work
    /// plus the task's `JoinHandle` (for graceful shutdown: drop the queue
    /// to close the channel, then await the handle so in-flight trades
    /// finish before the process exits — §5).
    pub fn spawn(
        executor: Arc<dyn ChainExecutor>,
        wallet_store: Arc<WalletStore>,
        rpc_gate: Arc<RpcGate>,
        ledger: Arc<PerformanceLedger>,
        notifier: Arc<dyn Notifier>,
        capacity: usize,
        confirmation_timeout: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(Self::run(
            receiver,
            executor,
            wallet_store,
            rpc_gate,
            ledger,
            notifier,
            confirmation_timeout,
        ));
        (Self { sender }, handle)
    }

    /// Enqueues a trade. Blocks (without dropping work) if the queue is at
    /// capacity, applying backpressure to producers rather than shedding
    /// opportunities.
    pub async fn submit(&self, request: TradeRequest) -> Result<(), CoreError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| CoreError::Fatal("trade queue consumer has shut down".to_string()))
    }

    async fn run(
        mut receiver: mpsc::Receiver<TradeRequest>,
        executor: Arc<dyn ChainExecutor>,
        wallet_store: Arc<WalletStore>,
        rpc_gate: Arc<RpcGate>,
        ledger: Arc<PerformanceLedger>,
        notifier: Arc<dyn Notifier>,
        confirmation_timeout: Duration,
    ) {
        while let Some(request) = receiver.recv().await {
            let user_id = request.user_id.clone();
            if let Err(err) = process_one(
                request,
                &executor,
                &wallet_store,
                &rpc_gate,
                &ledger,
                &notifier,
                confirmation_timeout,
            )
            .await
            {
                logger::error(
                    LogTag::TradeQueue,
                    &format!("trade processing failed for user {user_id}: {err}"),
                );
            }
        }
        logger::info(LogTag::TradeQueue, "trade queue consumer shut down");
    }
}

async fn process_one(
    request: TradeRequest,
    executor: &Arc<dyn ChainExecutor>,
    wallet_store: &Arc<WalletStore>,
    rpc_gate: &Arc<RpcGate>,
    ledger: &Arc<PerformanceLedger>,
    notifier: &Arc<dyn Notifier>,
    confirmation_timeout: Duration,
) -> Result<(), CoreError> {
    let TradeRequest {
        user_id,
        opportunity,
    } = request;

    // Step 1: borrow the user's signer. A missing/corrupt wallet fails this
    // one trade without touching the rest of the queue.
    let wallet = wallet_store.get_wallet_handle(&user_id).await?;

    // Step 2: acquire the shared RPC gate before every outbound call.
    rpc_gate.acquire().await;

    // Step 3: submit. A submission failure is recorded as `Failed` rather
    // than silently dropped, so it still shows up in the user's history.
    let submission = executor.submit(&wallet, &opportunity).await;

    let (outcome, tx_signature) = match submission {
        Ok(signature) => {
            rpc_gate.report_success();
            // Step 4: await confirmation, bounded by the configured timeout.
            match tokio::time::timeout(confirmation_timeout, executor.confirm(&signature)).await {
                Ok(Ok(true)) => (TradeOutcome::Success, Some(signature)),
                Ok(Ok(false)) => (TradeOutcome::Failed, Some(signature)),
                Ok(Err(err)) => {
                    logger::warning(
                        LogTag::TradeQueue,
                        &format!("confirmation check failed for {user_id}: {err}"),
                    );
                    (TradeOutcome::Failed, Some(signature))
                }
                Err(_) => (TradeOutcome::TimedOut, Some(signature)),
            }
        }
        Err(err) => {
            if err.is_retryable() {
                rpc_gate.report_rate_limited(err.retry_after()).await;
            }
            logger::warning(
                LogTag::TradeQueue,
                &format!("submission failed for {user_id}: {err}"),
            );
            (TradeOutcome::Failed, None)
        }
    };

    let profit = if outcome == TradeOutcome::Success {
        opportunity.opportunity.expected_profit
    } else {
        0.0
    };

    // Step 5: record the attempt regardless of outcome — the ledger tracks
    // attempts, not just wins (§4.6).
    let row = TradeRow {
        trade_id: 0,
        user_id: user_id.clone(),
        strategy_name: opportunity.opportunity.strategy_name.clone(),
        action: format!("{:?}", opportunity.opportunity.action),
        amount: opportunity.opportunity.amount as i64,
        profit,
        tx_signature,
        outcome,
        timestamp: Utc::now(),
        details: serde_json::json!({
            "mint": opportunity.opportunity.mint,
            "risk_tier": format!("{:?}", opportunity.risk_tier),
            "rationale": opportunity.opportunity.rationale,
        }),
    };
    ledger.record_trade(&row).await?;

    // Step 6: notify the user. Delivery failures never fail the trade
    // (§4.9 P7); the notifier itself already swallows those.
    let event = if outcome == TradeOutcome::Success {
        NotificationEvent::TradeExecuted
    } else {
        NotificationEvent::TradeFailed
    };
    let _ = notifier
        .notify(
            &user_id,
            event,
            &format!(
                "{:?} {} of {} — {outcome:?}",
                opportunity.opportunity.action,
                opportunity.opportunity.amount,
                opportunity.opportunity.mint
            ),
        )
        .await;

    Ok(())
}
