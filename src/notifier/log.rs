//! Log-only notifier. Used for tests and for deployments with no chat sink
//! configured (`telegram.enabled = false`, §6).

use async_trait::async_trait;

use crate::core::CoreResult;
use crate::logger::{self, LogTag};

use super::types::{NotificationEvent, Notifier};

pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: &str, event: NotificationEvent, message: &str) -> CoreResult<()> {
        logger::info(
            LogTag::Notifier,
            &format!("[{}] user {user_id}: {message}", event.as_str()),
        );
        Ok(())
    }
}
