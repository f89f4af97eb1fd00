//! Job payload types — shared between the scheduler engine and the dispatch
//! router.
//!
//! Jobs are plain data: a kind plus its parameters. The router in
//! `vigil-jobs` maps each kind to a handler and injects the live
//! dependencies (store, price gateway, notification sink) at dispatch time,
//! so nothing long-lived is ever captured inside the schedule itself.

use serde::{Deserialize, Serialize};

/// What a scheduled job does when it fires.
///
/// Stored as a JSON string in the `scheduled_jobs.payload` column for
/// admin-created jobs; built-in jobs (alert sweep, calendar digest) are
/// registered directly at startup and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    /// Run an asset analysis and broadcast the result to VIP recipients.
    AnalysisBroadcast { asset: String },
    /// Evaluate all active price alerts against the latest prices.
    AlertSweep,
    /// Scrape the economic calendar and send the digest to all recipients.
    CalendarDigest,
}

impl JobKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            JobKind::AnalysisBroadcast { .. } => "analysis_broadcast",
            JobKind::AlertSweep => "alert_sweep",
            JobKind::CalendarDigest => "calendar_digest",
        }
    }
}

/// A due job, handed from the scheduler loop to the dispatch router.
#[derive(Debug, Clone)]
pub struct FiredJob {
    /// The scheduler entry that fired — used for logging.
    pub job_id: String,
    pub kind: JobKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_kind_round_trips_through_json() {
        let kind = JobKind::AnalysisBroadcast {
            asset: "XAUUSD".into(),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains(r#""kind":"analysis_broadcast""#));
        let back: JobKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn unit_kinds_serialize_without_params() {
        let json = serde_json::to_string(&JobKind::AlertSweep).unwrap();
        assert_eq!(json, r#"{"kind":"alert_sweep"}"#);
    }
}
