//! Rate-limited gate in front of the chain RPC client.
//!
//! The Solana RPC client itself lives outside this crate; this module owns
//! only the shared rate limit/backoff state that balance reads and trade
//! submissions pass through before reaching it.

pub mod rate_limiter;

pub use rate_limiter::{ExponentialBackoff, ProviderRateLimiter, RateLimiterStatus, RpcGate};