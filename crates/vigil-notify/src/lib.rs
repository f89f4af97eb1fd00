//! `vigil-notify` — the notification sink seam and the fan-out primitive.
//!
//! Delivery to many recipients is concurrent with per-recipient failure
//! isolation: one refused chat never cancels or delays the others, and the
//! caller gets a structured per-recipient result set instead of swallowed
//! exceptions.

pub mod fanout;
pub mod sink;

pub use fanout::{fan_out, DeliveryOutcome, FanoutError, FanoutReport};
pub use sink::{NotificationSink, SinkError};
