//! Log tags identifying which component emitted a message.

/// One tag per major component (roughly C1-C11), plus a few cross-cutting
/// ones (System, Security, Test) and a catch-all for ad-hoc call sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    Wallet,
    BalanceOracle,
    PriceCache,
    Scanner,
    Ranker,
    TradeQueue,
    Ledger,
    Scheduler,
    RateLimiter,
    Notifier,
    Persistence,
    System,
    Security,
    Test,
    Other(String),
}

impl LogTag {
    /// Plain (uncolored) label used in file log lines.
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Wallet => "WALLET".to_string(),
            LogTag::BalanceOracle => "BALANCE".to_string(),
            LogTag::PriceCache => "PRICECACHE".to_string(),
            LogTag::Scanner => "SCANNER".to_string(),
            LogTag::Ranker => "RANKER".to_string(),
            LogTag::TradeQueue => "TRADEQ".to_string(),
            LogTag::Ledger => "LEDGER".to_string(),
            LogTag::Scheduler => "SCHEDULER".to_string(),
            LogTag::RateLimiter => "RATELIMIT".to_string(),
            LogTag::Notifier => "NOTIFIER".to_string(),
            LogTag::Persistence => "PERSIST".to_string(),
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Security => "SECURITY".to_string(),
            LogTag::Test => "TEST".to_string(),
            LogTag::Other(s) => s.clone(),
        }
    }

    /// Key used for `--debug-<key>` / `--verbose-<key>` lookups.
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::Wallet => "wallet",
            LogTag::BalanceOracle => "balance",
            LogTag::PriceCache => "price_cache",
            LogTag::Scanner => "scanner",
            LogTag::Ranker => "ranker",
            LogTag::TradeQueue => "trade_queue",
            LogTag::Ledger => "ledger",
            LogTag::Scheduler => "scheduler",
            LogTag::RateLimiter => "rate_limiter",
            LogTag::Notifier => "notifier",
            LogTag::Persistence => "persistence",
            LogTag::System => "system",
            LogTag::Security => "security",
            LogTag::Test => "test",
            LogTag::Other(s) => return s.to_lowercase(),
        }
        .to_string()
    }
}
