//! Shared types for the Notifier out-port (C10, §4.9).

use async_trait::async_trait;

use crate::core::CoreResult;

/// The events the core ever notifies a user about. Deliberately small and
/// closed — new event kinds are a core change, not a notifier change.
/// Matches §6's `eventKind ∈ {activated, deactivated, trade-succeeded,
/// trade-failed, error}` exactly, so a consumer can key off the structured
/// kind rather than parsing `message` (P6: activation and deactivation must
/// be distinguishable without inspecting free text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    WalletCreated,
    Activated,
    Deactivated,
    TradeExecuted,
    TradeFailed,
    Error,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::WalletCreated => "wallet_created",
            NotificationEvent::Activated => "activated",
            NotificationEvent::Deactivated => "deactivated",
            NotificationEvent::TradeExecuted => "trade-succeeded",
            NotificationEvent::TradeFailed => "trade-failed",
            NotificationEvent::Error => "error",
        }
    }
}

/// Delivers user-facing notifications. A delivery failure is logged by the
/// implementation and must never fail the business operation that
/// triggered it (§4.9 P7: "a notifier outage must not block trading").
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &str, event: NotificationEvent, message: &str) -> CoreResult<()>;
}
