//! Structured logging used throughout the crate.
//!
//! - Tagged by component (`LogTag`), so every line shows what emitted it
//! - Standard levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug/verbose control via `--debug-<tag>` / `--verbose-<tag>`
//! - Dual output: colored console + rotating file
//!
//! ## Usage
//!
//! ```rust
//! use trading_core::logger::{self, LogTag};
//!
//! logger::error(LogTag::Wallet, "failed to unlock wallet store");
//! logger::warning(LogTag::RateLimiter, "approaching sustained rate");
//! logger::info(LogTag::Scheduler, "scan cycle complete");
//! logger::debug(LogTag::Scanner, "opportunity details: ..."); // only if --debug-scanner
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, before any other logging occurs:
//! ```rust
//! logger::init(&std::env::args().collect::<Vec<_>>());
//! ```

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

// Re-export public types
pub use config::{
    get_logger_config, init_from_args, set_logger_config, update_logger_config, LoggerConfig,
};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system. Must be called once at startup, before any
/// other logging occurs. `args` is the process's raw argv (or equivalent),
/// used to populate per-tag debug/verbose flags.
pub fn init(args: &[String]) {
    config::init_from_args(args);
    file::init_file_logging();
}

/// Log at ERROR level (always shown, critical issues)
///
/// Errors are always displayed regardless of debug flags or verbosity settings.
/// Use for critical failures that need immediate attention.
///
/// # Example
/// ```rust
/// logger::error(LogTag::Wallet, "Failed to load wallet keypair");
/// ```
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
///
/// Warnings are shown by default (unless --quiet is used).
/// Use for issues that need attention but aren't critical.
///
/// # Example
/// ```rust
/// logger::warning(LogTag::Api, "Rate limit approaching (80% used)");
/// ```
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
///
/// Info logs are shown by default and represent normal operation.
/// Use for important operational events.
///
/// # Example
/// ```rust
/// logger::info(LogTag::Trader, "Position opened: 1.5 SOL");
/// ```
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics)
///
/// Debug logs are ONLY shown when --debug-<module> flag is provided.
/// Automatically filtered based on the tag.
///
/// # Example
/// ```rust
/// // Only shown with --debug-api flag
/// logger::debug(LogTag::Api, "Request headers: {...}");
///
/// // Only shown with --debug-tokens flag
/// logger::debug(LogTag::Tokens, "Token metadata: {...}");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing)
///
/// Verbose logs are ONLY shown when --verbose flag is provided.
/// Use for extremely detailed diagnostic information.
///
/// # Example
/// ```rust
/// // Only shown with --verbose flag
/// logger::verbose(LogTag::Pool, "Raw pool account data: [...]");
/// ```
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
///
/// Call this during shutdown to ensure all logs are written to disk.
pub fn flush() {
    file::flush_file_logging();
}
