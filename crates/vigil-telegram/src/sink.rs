//! `NotificationSink` over a teloxide `Bot`.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::warn;

use vigil_notify::{NotificationSink, SinkError};

use crate::send::split_chunks;

/// Sends through the Telegram bot API. Recipients are chat ids.
///
/// Each chunk is tried as Markdown first; if Telegram rejects the parse
/// mode (bad markup in scraped text, usually) the chunk is resent plain.
/// A 100 ms pause between consecutive chunks keeps us under rate limits.
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, recipient: i64, text: &str) -> Result<(), SinkError> {
        let chat_id = ChatId(recipient);
        let chunks = split_chunks(text);

        for (i, chunk) in chunks.iter().enumerate() {
            let sent = self
                .bot
                .send_message(chat_id, chunk)
                .parse_mode(ParseMode::Markdown)
                .await;

            if let Err(e) = sent {
                warn!(recipient, chunk_index = i, error = %e, "markdown send rejected — retrying plain");
                self.bot
                    .send_message(chat_id, chunk)
                    .await
                    .map_err(|e| SinkError::Transport(e.to_string()))?;
            }

            if i + 1 < chunks.len() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
        Ok(())
    }
}
