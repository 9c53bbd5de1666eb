/// Runtime logger configuration system
///
/// This module manages the logger's runtime state, including:
/// - Which log levels to show
/// - Which modules have debug mode enabled (from --debug-<module> flags)
/// - Output settings (console, file, colors)

use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Logger runtime configuration
#[derive(Clone)]
pub struct LoggerConfig {
    /// Minimum log level to display (filters out lower priority logs)
    pub min_level: LogLevel,

    /// Per-module debug mode flags (populated from command-line arguments)
    /// Key: LogTag, Value: whether debug mode is enabled for that tag
    pub debug_modes: HashMap<String, bool>,

    /// Per-module verbose mode flags (populated from command-line arguments)
    /// Key: LogTag, Value: whether verbose mode is enabled for that tag
    pub verbose_modes: HashMap<String, bool>,

    /// Specific tags to enable (empty = all enabled)
    pub enabled_tags: HashSet<String>,

    /// Console output enabled
    pub console_enabled: bool,

    /// File output enabled
    pub file_enabled: bool,

    /// Color output enabled
    pub colors_enabled: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_modes: HashMap::new(),
            verbose_modes: HashMap::new(),
            enabled_tags: HashSet::new(), // Empty = all enabled
            console_enabled: true,
            file_enabled: true,
            colors_enabled: true,
        }
    }
}

/// Global logger configuration singleton
static LOGGER_CONFIG: Lazy<Arc<RwLock<LoggerConfig>>> =
    Lazy::new(|| Arc::new(RwLock::new(LoggerConfig::default())));

/// Get a copy of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Set the logger configuration (replaces entire config)
pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// Update logger configuration with a closure
pub fn update_logger_config<F>(f: F)
where
    F: FnOnce(&mut LoggerConfig),
{
    let mut config = LOGGER_CONFIG.write().unwrap_or_else(|e| e.into_inner());
    f(&mut config);
}

/// Recognized `--debug-<key>` / `--verbose-<key>` suffixes, one per
/// component tag.
const KNOWN_TAG_KEYS: &[&str] = &[
    "wallet",
    "balance",
    "price_cache",
    "scanner",
    "ranker",
    "trade_queue",
    "ledger",
    "scheduler",
    "rate_limiter",
    "notifier",
    "persistence",
    "system",
    "security",
    "test",
];

/// Initialize logger configuration from already-parsed CLI arguments.
///
/// The composition root parses `clap` arguments and passes the raw argv
/// here rather than this module re-scanning the process's argv itself, so
/// the logger has no dependency on a particular CLI parsing library.
pub fn init_from_args(args: &[String]) {
    let mut config = LoggerConfig::default();

    for arg in args {
        if let Some(key) = arg.strip_prefix("--debug-") {
            let key = key.replace('-', "_");
            if KNOWN_TAG_KEYS.contains(&key.as_str()) {
                config.debug_modes.insert(key, true);
            }
        } else if let Some(key) = arg.strip_prefix("--verbose-") {
            let key = key.replace('-', "_");
            if KNOWN_TAG_KEYS.contains(&key.as_str()) {
                config.verbose_modes.insert(key, true);
            }
        }
    }

    if args.iter().any(|a| a == "--verbose" || a == "-v") {
        config.min_level = LogLevel::Verbose;
    }

    if args.iter().any(|a| a == "--quiet" || a == "-q") {
        config.min_level = LogLevel::Warning;
    }

    set_logger_config(config);
}

/// Check if debug mode is enabled for a specific tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    let tag_name = tag.to_debug_key();
    config.debug_modes.get(&tag_name).copied().unwrap_or(false)
}

/// Check if verbose mode is enabled for a specific tag
pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    let tag_name = tag.to_debug_key();
    config.verbose_modes.get(&tag_name).copied().unwrap_or(false)
}
