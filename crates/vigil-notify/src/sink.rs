use async_trait::async_trait;
use thiserror::Error;

/// One delivery attempt's failure. Cloneable so reports can carry it.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("send timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Message transport supplied by a channel adapter (Telegram in the shipped
/// binary). `recipient` is the transport's chat id.
///
/// Implementations own their chunking and rate limiting; callers hand over
/// the full text and get one result per recipient.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient: i64, text: &str) -> Result<(), SinkError>;
}
