//! Telegram-backed notifier (§4.9, behind the `telegram` feature). Sends
//! every event to a single configured chat, prefixed with the user ID, so
//! an operator can watch the whole tenant population from one channel.
//! Per-user delivery is an explicit Non-goal (§3): this is an operator
//! notification sink, not a user-facing chat integration.

use async_trait::async_trait;
use teloxide::prelude::*;

use crate::core::CoreResult;
use crate::logger::{self, LogTag};

use super::types::{NotificationEvent, Notifier};

pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(bot_token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, user_id: &str, event: NotificationEvent, message: &str) -> CoreResult<()> {
        let text = format!("[{}] {user_id}: {message}", event.as_str());
        if let Err(err) = self.bot.send_message(self.chat_id, text).await {
            // A delivery failure must never fail the business operation that
            // triggered it (§4.9 P7); log and swallow.
            logger::error(
                LogTag::Notifier,
                &format!("telegram delivery failed for user {user_id}: {err}"),
            );
        }
        Ok(())
    }
}
