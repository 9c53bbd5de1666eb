//! All configuration structures, defined once with embedded defaults via the
//! `config_struct!` macro (see `macros.rs`). Every tunable named in SPEC_FULL.md
//! §6 plus the ambient ones (database path, log level, notifier credentials)
//! lives here as a field on a typed, `Default`-implementing struct.

use crate::config_struct;

config_struct! {
    /// Scheduler (C8) tunables.
    pub struct SchedulerConfig {
        /// Base cycle period in seconds; default 300, minimum 5 (enforced by
        /// `Config::validate`).
        scan_interval_secs: u64 = 300,
        /// Threshold below which scanning is skipped for a user, in base units
        /// (lamports). Default 0.01 SOL.
        min_trading_balance: u64 = 10_000_000,
        /// Balances fetched per batch RPC call.
        rpc_batch_size: usize = 10,
        /// User count above which the scheduler staggers scan start times.
        stagger_threshold_users: usize = 100,
        /// Seconds over which staggered scans are spread.
        stagger_window_secs: u64 = 60,
        /// Fraction by which `scan_interval_secs` is widened (interval *=
        /// 1.0 + this) when the RPC gate reported a rate-limit signal during
        /// the previous cycle. Default 0.5 (+50%, per §4.8 step 5).
        rate_limit_backoff: f64 = 0.5,
        /// Consecutive empty cycles (no opportunities for any user) before the
        /// scheduler widens its interval.
        empty_scan_threshold: u32 = 10,
        /// Extra sleep (seconds) added to the interval once `empty_scan_threshold`
        /// is reached.
        empty_scan_extra_secs: u64 = 30,
        /// Size of the bounded per-cycle balance fan-out pool.
        balance_fanout_concurrency: usize = 4,
        /// Size of the bounded per-cycle per-user scan pool.
        scan_concurrency: usize = 8,
        /// Bound on the trade queue channel; producers block when full.
        trade_queue_capacity: usize = 256,
    }
}

config_struct! {
    /// Balance Oracle (C2) and Price Cache (C3) tunables.
    pub struct CacheConfig {
        /// Seconds a balance snapshot is trusted before re-fetching.
        balance_cache_ttl_secs: u64 = 10,
        /// Seconds a price cache entry remains fresh.
        price_cache_ttl_secs: u64 = 120,
    }
}

config_struct! {
    /// Chain connection (feeds the Balance Oracle's and Trade Queue's RPC
    /// client; not part of the Rate Limiter's own tunables).
    pub struct ChainConfig {
        rpc_url: String = "https://api.mainnet-beta.solana.com".to_string(),
    }
}

config_struct! {
    /// Rate Limiter / RPC Gate (C9) tunables.
    pub struct RateLimitConfig {
        /// Sustained calls/second.
        sustained: u32 = 20,
        /// Burst allowance on top of sustained.
        burst: u32 = 40,
    }
}

config_struct! {
    /// Trade Queue (C6) tunables.
    pub struct TradeConfig {
        /// Seconds to await chain confirmation per trade before recording
        /// `timed-out`.
        confirmation_timeout_secs: u64 = 60,
    }
}

config_struct! {
    /// Secure Wallet Store (C1) tunables.
    pub struct WalletStoreConfig {
        /// Name of the environment variable holding the system-held master
        /// secret used to derive the per-wallet encryption key. Never the
        /// secret's value itself.
        master_secret_env: String = "TRADING_CORE_MASTER_SECRET".to_string(),
        /// BIP44-style derivation path used for every wallet this store creates.
        derivation_path: String = "m/44'/501'/0'/0'".to_string(),
    }
}

config_struct! {
    /// SQLite persistence (C11) location.
    pub struct DatabaseConfig {
        path: String = "data/trading-core.db".to_string(),
    }
}

config_struct! {
    /// Ambient logging surface.
    pub struct LoggingConfig {
        min_level: String = "info".to_string(),
        file_enabled: bool = true,
    }
}

config_struct! {
    /// Telegram-backed Notifier (C10) credentials.
    pub struct TelegramConfig {
        enabled: bool = false,
        bot_token: String = String::new(),
        chat_id: String = String::new(),
    }
}

config_struct! {
    /// Root configuration, composed of every section above. Constructed once
    /// at startup as an `Arc<Config>` and threaded through every component's
    /// constructor — never a process-global singleton (§9 design notes,
    /// sharpened to the config layer in SPEC_FULL.md §1.1).
    pub struct Config {
        scheduler: SchedulerConfig = SchedulerConfig::default(),
        cache: CacheConfig = CacheConfig::default(),
        chain: ChainConfig = ChainConfig::default(),
        rate_limit: RateLimitConfig = RateLimitConfig::default(),
        trade: TradeConfig = TradeConfig::default(),
        wallet_store: WalletStoreConfig = WalletStoreConfig::default(),
        database: DatabaseConfig = DatabaseConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
        telegram: TelegramConfig = TelegramConfig::default(),
    }
}
