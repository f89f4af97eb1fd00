//! `vigil-telegram` — Telegram implementation of the notification sink.
//!
//! Telegram caps messages at 4096 characters; long digests are split into
//! chunks and flushed in order, so content is never truncated.

pub mod send;
pub mod sink;

pub use sink::TelegramSink;
