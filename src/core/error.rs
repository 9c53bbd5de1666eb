//! Crate-wide error taxonomy (§7).
//!
//! One enum, one variant per error kind named in the specification. Classification
//! helpers (`is_retryable`, `is_user_actionable`, `is_fatal`) let the scheduler and
//! trade-queue consumer share a single translation function into Trade Record
//! outcomes and Notifier events instead of duplicating match arms at every call site.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// No wallet exists for the user. Surfaced to the caller; never retried.
    #[error("no wallet found for user {user_id}")]
    NotFound { user_id: String },

    /// Duplicate wallet creation/import. Surfaced; never retried.
    #[error("user {user_id} already has a wallet")]
    AlreadyExists { user_id: String },

    /// Malformed mnemonic, bad word count, failed checksum, or similar.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Caller user ID did not match the target user ID. Logged at security level.
    #[error("user {caller} is not authorized to act on behalf of {target}")]
    Unauthorized { caller: String, target: String },

    /// Network error, timeout, or rate-limited RPC response. Recovered locally:
    /// balance reads fall back to cache, trade submissions are recorded failed.
    #[error("transient RPC error: {0}")]
    TransientRpc(String),

    /// A strategy's scan or action raised. Caught inside the Scanner or Trade
    /// Queue, logged with user+strategy context; other strategies/trades continue.
    #[error("strategy {strategy} failed for user {user_id}: {reason}")]
    StrategyError {
        strategy: String,
        user_id: String,
        reason: String,
    },

    /// Storage write failed.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Configuration missing or database unreachable at startup. Process refuses
    /// to start.
    #[error("fatal startup error: {0}")]
    Fatal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Transient failures the caller may retry (next cycle, next call).
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::TransientRpc(_))
    }

    /// Errors with a human-readable remedy that should reach the end user, as
    /// opposed to transient errors which are operator-log-only (§7).
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            CoreError::NotFound { .. }
                | CoreError::AlreadyExists { .. }
                | CoreError::InvalidInput { .. }
        )
    }

    /// Whether this is the one kind the composition root must not swallow:
    /// every other kind is caught by the scheduler / trade-queue consumer and
    /// translated into a Trade Record and/or Notifier event (§7 propagation
    /// policy).
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Fatal(_))
    }

    /// Suggested backoff before a caller retries, if any.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            CoreError::TransientRpc(_) => Some(std::time::Duration::from_secs(5)),
            _ => None,
        }
    }

    /// Human-readable guidance shown to the end user for actionable errors
    /// (§7: "you already have a wallet; use exportKey to retrieve it").
    pub fn user_message(&self) -> String {
        match self {
            CoreError::NotFound { .. } => {
                "you don't have a wallet yet; use createWallet to make one".to_string()
            }
            CoreError::AlreadyExists { .. } => {
                "you already have a wallet; use exportKey to retrieve it".to_string()
            }
            CoreError::InvalidInput { reason } => format!("invalid input: {reason}"),
            CoreError::Unauthorized { .. } => "you are not authorized to do that".to_string(),
            _ => "an internal error occurred; please try again later".to_string(),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::PersistenceError(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::PersistenceError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_rpc_is_retryable_and_not_user_actionable() {
        let e = CoreError::TransientRpc("timeout".into());
        assert!(e.is_retryable());
        assert!(!e.is_user_actionable());
        assert!(e.retry_after().is_some());
    }

    #[test]
    fn already_exists_is_user_actionable_and_not_retryable() {
        let e = CoreError::AlreadyExists {
            user_id: "U1".into(),
        };
        assert!(e.is_user_actionable());
        assert!(!e.is_retryable());
        assert!(e.user_message().contains("exportKey"));
    }

    #[test]
    fn fatal_is_never_retryable_or_actionable() {
        let e = CoreError::Fatal("no database configured".into());
        assert!(e.is_fatal());
        assert!(!e.is_retryable());
        assert!(!e.is_user_actionable());
    }
}
