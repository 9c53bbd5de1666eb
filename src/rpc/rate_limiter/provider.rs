//! Token-bucket core for the shared RPC gate (Governor / GCRA algorithm).

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A single token-bucket rate limiter with adaptive backoff on repeated
/// rate-limit signals from the RPC backend.
///
/// Named `ProviderRateLimiter` for historical reasons: earlier in this
/// codebase's lineage one of these existed per upstream RPC provider. This
/// crate only ever constructs one, shared by every caller of the RPC gate.
pub struct ProviderRateLimiter {
    provider_id: String,
    limiter: GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>,
    base_rate: u32,
    current_rate: AtomicU32,
    consecutive_limit_signals: AtomicU32,
    last_limit_signal: RwLock<Option<Instant>>,
    backoff_multiplier: f64,
    min_rate: u32,
    recovery_rate: f64,
    recovery_threshold: u32,
    recovery_progress: AtomicU32,
}

impl ProviderRateLimiter {
    /// Create a new limiter enforcing `rate_per_second` sustained throughput.
    pub fn new(provider_id: &str, rate_per_second: u32) -> Self {
        let rate = rate_per_second.max(1);
        let quota = Quota::per_second(NonZeroU32::new(rate).unwrap());

        Self {
            provider_id: provider_id.to_string(),
            limiter: GovernorLimiter::direct(quota),
            base_rate: rate,
            current_rate: AtomicU32::new(rate),
            consecutive_limit_signals: AtomicU32::new(0),
            last_limit_signal: RwLock::new(None),
            backoff_multiplier: 0.5,
            min_rate: 1,
            recovery_rate: 0.1,
            recovery_threshold: 10,
            recovery_progress: AtomicU32::new(0),
        }
    }

    /// Create a limiter with an explicit burst allowance on top of the
    /// sustained rate, matching `rateLimit.sustained` / `rateLimit.burst`.
    pub fn with_burst(provider_id: &str, sustained: u32, burst: u32) -> Self {
        let sustained = sustained.max(1);
        let burst = burst.max(sustained);
        let quota = Quota::per_second(NonZeroU32::new(sustained).unwrap())
            .allow_burst(NonZeroU32::new(burst).unwrap());

        Self {
            provider_id: provider_id.to_string(),
            limiter: GovernorLimiter::direct(quota),
            base_rate: sustained,
            current_rate: AtomicU32::new(sustained),
            consecutive_limit_signals: AtomicU32::new(0),
            last_limit_signal: RwLock::new(None),
            backoff_multiplier: 0.5,
            min_rate: 1,
            recovery_rate: 0.1,
            recovery_threshold: 10,
            recovery_progress: AtomicU32::new(0),
        }
    }

    /// Create with custom backoff settings.
    pub fn with_backoff(
        provider_id: &str,
        rate_per_second: u32,
        backoff_multiplier: f64,
        min_rate: u32,
    ) -> Self {
        let mut limiter = Self::new(provider_id, rate_per_second);
        limiter.backoff_multiplier = backoff_multiplier.clamp(0.1, 0.9);
        limiter.min_rate = min_rate.max(1);
        limiter
    }

    /// Acquire a single token, parking the caller until one is available.
    /// One token corresponds to one outbound RPC call (§4.9).
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire without blocking. Returns `false` if the bucket is
    /// currently empty.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Record a rate-limit error reported by the RPC backend despite the
    /// bucket permitting the call (i.e. the remote side is stricter than our
    /// local estimate). Reduces the effective rate and tracks recovery.
    pub async fn record_rate_limit_signal(&self, retry_after: Option<Duration>) {
        let count = self.consecutive_limit_signals.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut last = self.last_limit_signal.write().await;
            *last = Some(Instant::now());
        }

        let reduction = self.backoff_multiplier.powi(count as i32);
        let new_rate = ((self.base_rate as f64) * reduction).max(self.min_rate as f64) as u32;
        self.current_rate.store(new_rate, Ordering::SeqCst);
        self.recovery_progress.store(0, Ordering::SeqCst);

        if let Some(delay) = retry_after {
            if delay > Duration::from_millis(100) && delay < Duration::from_secs(60) {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Record a successful request, gradually recovering the rate after a
    /// prior rate-limit signal.
    pub fn record_success(&self) {
        let consecutive = self.consecutive_limit_signals.load(Ordering::SeqCst);
        if consecutive == 0 {
            return;
        }

        let progress = self.recovery_progress.fetch_add(1, Ordering::SeqCst) + 1;
        if progress >= self.recovery_threshold {
            self.consecutive_limit_signals.store(0, Ordering::SeqCst);
            self.current_rate.store(self.base_rate, Ordering::SeqCst);
            self.recovery_progress.store(0, Ordering::SeqCst);
        } else {
            let current = self.current_rate.load(Ordering::SeqCst);
            let recovery_amount = ((self.base_rate - current) as f64 * self.recovery_rate) as u32;
            let new_rate = (current + recovery_amount).min(self.base_rate);
            self.current_rate.store(new_rate, Ordering::SeqCst);
        }
    }

    pub fn current_rate(&self) -> u32 {
        self.current_rate.load(Ordering::SeqCst)
    }

    pub fn base_rate(&self) -> u32 {
        self.base_rate
    }

    pub fn is_backing_off(&self) -> bool {
        self.consecutive_limit_signals.load(Ordering::SeqCst) > 0
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub async fn time_since_last_limit_signal(&self) -> Option<Duration> {
        let last = self.last_limit_signal.read().await;
        last.map(|t| t.elapsed())
    }

    pub fn reset(&self) {
        self.consecutive_limit_signals.store(0, Ordering::SeqCst);
        self.current_rate.store(self.base_rate, Ordering::SeqCst);
        self.recovery_progress.store(0, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for ProviderRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRateLimiter")
            .field("provider_id", &self.provider_id)
            .field("base_rate", &self.base_rate)
            .field("current_rate", &self.current_rate.load(Ordering::SeqCst))
            .field(
                "consecutive_limit_signals",
                &self.consecutive_limit_signals.load(Ordering::SeqCst),
            )
            .field("is_backing_off", &self.is_backing_off())
            .finish()
    }
}
