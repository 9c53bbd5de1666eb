//! Layered, typed configuration (SPEC_FULL.md §1.1).
//!
//! Every tunable is a field on a `Default`-implementing struct, loadable from a
//! TOML file with an in-code fallback to defaults, and constructible purely in
//! memory for tests. The loaded `Config` is wrapped in an `Arc` by the
//! composition root and passed explicitly into every constructor; this module
//! holds no global state.

#[macro_use]
pub mod macros;
pub mod schema;

pub use schema::{
    CacheConfig, ChainConfig, Config, DatabaseConfig, LoggingConfig, RateLimitConfig,
    SchedulerConfig, TelegramConfig, TradeConfig, WalletStoreConfig,
};

use crate::core::CoreError;
use std::path::Path;

impl Config {
    /// Load from `path` if it exists, falling back to defaults otherwise.
    /// Fails with `CoreError::Fatal` only if the file exists but cannot be
    /// parsed — a missing file is not an error (§1.1: "in-code fallback to
    /// defaults").
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CoreError::Fatal(format!("failed to read config {path:?}: {e}")))?;
            toml::from_str::<Config>(&contents)
                .map_err(|e| CoreError::Fatal(format!("failed to parse config {path:?}: {e}")))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configuration that would violate an invariant named in the spec
    /// (e.g. `scanInterval` minimum 5 s) rather than silently clamping it.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.scheduler.scan_interval_secs < 5 {
            return Err(CoreError::Fatal(
                "scheduler.scan_interval_secs must be at least 5".to_string(),
            ));
        }
        if self.scheduler.rpc_batch_size == 0 {
            return Err(CoreError::Fatal(
                "scheduler.rpc_batch_size must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.burst < self.rate_limit.sustained {
            return Err(CoreError::Fatal(
                "rate_limit.burst must be >= rate_limit.sustained".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load(Path::new("/nonexistent/does-not-exist.toml")).unwrap();
        assert_eq!(cfg.scheduler.scan_interval_secs, 300);
    }

    #[test]
    fn rejects_interval_below_minimum() {
        let mut cfg = Config::default();
        cfg.scheduler.scan_interval_secs = 1;
        assert!(cfg.validate().is_err());
    }
}
