//! Notifier out-port (C10, §4.9): user-facing event delivery, pluggable
//! behind the `Notifier` trait so the core never depends on a specific chat
//! backend.

pub mod log;
#[cfg(feature = "telegram")]
pub mod telegram;
pub mod types;

pub use log::LogNotifier;
#[cfg(feature = "telegram")]
pub use telegram::TelegramNotifier;
pub use types::{NotificationEvent, Notifier};
