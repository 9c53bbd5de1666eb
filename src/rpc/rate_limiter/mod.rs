//! The shared RPC gate (C9).
//!
//! A single token-bucket shared by the Balance Oracle and the Trade Queue.
//! One token is consumed per outbound RPC call; callers are parked when the
//! bucket is empty. When the RPC backend reports a rate-limit error despite
//! the bucket permitting the call, the gate temporarily reduces its
//! effective rate and records that signal so the scheduler can widen its
//! cycle interval (§4.8 step 5).

pub mod adaptive;
pub mod provider;

pub use adaptive::{ExponentialBackoff, SlidingWindowTracker};
pub use provider::ProviderRateLimiter;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Point-in-time status of the shared gate, useful for health/metrics
/// reporting.
#[derive(Debug, Clone)]
pub struct RateLimiterStatus {
    pub provider_id: String,
    pub base_rate: u32,
    pub current_rate: u32,
    pub is_backing_off: bool,
}

/// The RPC gate every outbound call passes through.
///
/// Constructed once at composition time and shared (`Arc<RpcGate>`) between
/// the Balance Oracle and the Trade Queue consumer — never a process-global
/// singleton (§9 redesign notes).
pub struct RpcGate {
    limiter: ProviderRateLimiter,
    rate_limited_since_last_check: AtomicBool,
}

impl RpcGate {
    /// Build a gate enforcing `sustained` calls/second with a `burst`
    /// allowance, matching the `rateLimit.sustained` / `rateLimit.burst`
    /// configuration fields.
    pub fn new(sustained: u32, burst: u32) -> Self {
        Self {
            limiter: ProviderRateLimiter::with_burst("rpc-gate", sustained, burst),
            rate_limited_since_last_check: AtomicBool::new(false),
        }
    }

    /// Acquire one token, parking the caller if the bucket is empty. Every
    /// outbound RPC call — balance reads and trade submissions alike — must
    /// go through this before reaching the chain client.
    pub async fn acquire(&self) {
        self.limiter.acquire().await;
    }

    /// Non-blocking variant; `false` means the caller should back off.
    pub fn try_acquire(&self) -> bool {
        self.limiter.try_acquire()
    }

    /// Report that the RPC backend returned a rate-limit error despite the
    /// local bucket allowing the call. Reduces the gate's effective rate and
    /// marks the signal so [`Self::take_rate_limited_signal`] observes it.
    pub async fn report_rate_limited(&self, retry_after: Option<Duration>) {
        self.rate_limited_since_last_check
            .store(true, Ordering::SeqCst);
        self.limiter.record_rate_limit_signal(retry_after).await;
    }

    /// Report a successful call, letting the gate recover towards its base
    /// rate.
    pub fn report_success(&self) {
        self.limiter.record_success();
    }

    /// Consume and reset the "were we rate-limited since the last check"
    /// flag. The scheduler calls this once per cycle (§4.8 step 5) to decide
    /// whether to widen its interval.
    pub fn take_rate_limited_signal(&self) -> bool {
        self.rate_limited_since_last_check
            .swap(false, Ordering::SeqCst)
    }

    pub fn status(&self) -> RateLimiterStatus {
        RateLimiterStatus {
            provider_id: self.limiter.provider_id().to_string(),
            base_rate: self.limiter.base_rate(),
            current_rate: self.limiter.current_rate(),
            is_backing_off: self.limiter.is_backing_off(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_does_not_block_within_burst() {
        let gate = RpcGate::new(10, 10);
        for _ in 0..10 {
            gate.acquire().await;
        }
    }

    #[tokio::test]
    async fn rate_limit_signal_is_observed_once() {
        let gate = RpcGate::new(10, 10);
        gate.report_rate_limited(None).await;
        assert!(gate.take_rate_limited_signal());
        assert!(!gate.take_rate_limited_signal());
    }

    #[test]
    fn backoff_reduces_then_recovers() {
        let limiter = ProviderRateLimiter::new("test", 10);
        assert_eq!(limiter.current_rate(), 10);
        futures::executor::block_on(limiter.record_rate_limit_signal(None));
        assert!(limiter.current_rate() < 10);
        for _ in 0..20 {
            limiter.record_success();
        }
        assert_eq!(limiter.current_rate(), 10);
    }
}
