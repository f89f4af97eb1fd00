use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::sink::{NotificationSink, SinkError};

#[derive(Debug, Error)]
pub enum FanoutError {
    /// The batch could not even start — there is nobody to deliver to.
    #[error("no recipients")]
    NoRecipients,
}

/// What happened to one recipient's delivery.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub recipient: i64,
    pub result: Result<(), SinkError>,
}

/// Aggregate of one fan-out call.
#[derive(Debug, Clone)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failed: usize,
    pub outcomes: Vec<DeliveryOutcome>,
}

impl FanoutReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }
}

/// Deliver `text` to every recipient concurrently.
///
/// All sends are attempted regardless of individual failures; each failure
/// is caught, counted, and carried in the report. No ordering guarantee.
/// The only error is an empty recipient set.
pub async fn fan_out(
    sink: &dyn NotificationSink,
    recipients: &[i64],
    text: &str,
) -> Result<FanoutReport, FanoutError> {
    if recipients.is_empty() {
        return Err(FanoutError::NoRecipients);
    }

    let sends = recipients.iter().map(|&recipient| async move {
        let result = sink.send(recipient, text).await;
        if let Err(ref e) = result {
            warn!(recipient, error = %e, "delivery failed");
        }
        DeliveryOutcome { recipient, result }
    });
    let outcomes = join_all(sends).await;

    let delivered = outcomes.iter().filter(|o| o.result.is_ok()).count();
    let failed = outcomes.len() - delivered;
    debug!(delivered, failed, "fan-out complete");

    Ok(FanoutReport {
        delivered,
        failed,
        outcomes,
    })
}
