use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Which side of the target price an alert watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl std::fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertDirection::Above => "above",
            AlertDirection::Below => "below",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AlertDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "above" => Ok(AlertDirection::Above),
            "below" => Ok(AlertDirection::Below),
            other => Err(format!("unknown alert direction: {other}")),
        }
    }
}

/// An admin-created recurring analysis job.
///
/// The id is derived from (asset, hour, minute), so scheduling the same
/// asset at the same time twice collapses onto one row instead of silently
/// duplicating the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub job_id: String,
    pub asset: String,
    /// Fire hour in the job's own timezone, 0-23.
    pub hour: u8,
    /// Fire minute, 0-59.
    pub minute: u8,
    /// IANA zone name the fire time is evaluated in.
    pub timezone: String,
}

impl ScheduledJob {
    /// Build a validated job record. The id is always `job_id_for(..)` —
    /// callers cannot pick their own.
    pub fn new(asset: &str, hour: u8, minute: u8, timezone: &str) -> Result<Self, StoreError> {
        let asset = asset.trim().to_uppercase();
        if asset.is_empty() {
            return Err(StoreError::InvalidJob("asset must not be empty".into()));
        }
        if hour > 23 {
            return Err(StoreError::InvalidJob(format!("hour out of range: {hour}")));
        }
        if minute > 59 {
            return Err(StoreError::InvalidJob(format!(
                "minute out of range: {minute}"
            )));
        }
        if timezone.parse::<Tz>().is_err() {
            return Err(StoreError::InvalidJob(format!(
                "unknown timezone: {timezone}"
            )));
        }
        Ok(Self {
            job_id: Self::job_id_for(&asset, hour, minute),
            asset,
            hour,
            minute,
            timezone: timezone.to_string(),
        })
    }

    /// Deterministic id: `task_XAUUSD_8_30` for XAUUSD at 08:30.
    pub fn job_id_for(asset: &str, hour: u8, minute: u8) -> String {
        format!("task_{}_{}_{}", asset.to_uppercase(), hour, minute)
    }

    /// The job's resolved timezone. Validation at construction guarantees
    /// this parses; rows written by older schema versions fall back to UTC.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

/// A user-defined price threshold watch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: i64,
    pub owner_id: i64,
    pub asset: String,
    pub target_price: f64,
    pub direction: AlertDirection,
    pub is_active: bool,
    /// One-time alerts deactivate after the first trigger; recurring alerts
    /// fire on every sweep where the condition holds.
    pub is_one_time: bool,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

impl PriceAlert {
    /// Inclusive threshold test: hitting the target exactly triggers.
    pub fn is_triggered_by(&self, price: f64) -> bool {
        match self.direction {
            AlertDirection::Above => price >= self.target_price,
            AlertDirection::Below => price <= self.target_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_deterministic_and_uppercased() {
        let job = ScheduledJob::new("xauusd", 8, 30, "Asia/Baghdad").unwrap();
        assert_eq!(job.job_id, "task_XAUUSD_8_30");
        assert_eq!(job.asset, "XAUUSD");
        assert_eq!(
            ScheduledJob::job_id_for("xauusd", 8, 30),
            ScheduledJob::job_id_for("XAUUSD", 8, 30),
        );
    }

    #[test]
    fn job_rejects_out_of_range_time() {
        assert!(ScheduledJob::new("XAUUSD", 24, 0, "UTC").is_err());
        assert!(ScheduledJob::new("XAUUSD", 0, 60, "UTC").is_err());
    }

    #[test]
    fn job_rejects_unknown_timezone() {
        assert!(ScheduledJob::new("XAUUSD", 8, 30, "Atlantis/Central").is_err());
    }

    #[test]
    fn job_rejects_empty_asset() {
        assert!(ScheduledJob::new("  ", 8, 30, "UTC").is_err());
    }

    #[test]
    fn direction_round_trips_through_str() {
        assert_eq!("above".parse::<AlertDirection>(), Ok(AlertDirection::Above));
        assert_eq!(AlertDirection::Below.to_string(), "below");
        assert!("sideways".parse::<AlertDirection>().is_err());
    }

    #[test]
    fn trigger_boundary_is_inclusive() {
        let alert = PriceAlert {
            id: 1,
            owner_id: 7,
            asset: "XAUUSD".into(),
            target_price: 2300.0,
            direction: AlertDirection::Above,
            is_active: true,
            is_one_time: true,
            created_at: Utc::now(),
            triggered_at: None,
        };
        assert!(alert.is_triggered_by(2300.0));
        assert!(alert.is_triggered_by(2300.01));
        assert!(!alert.is_triggered_by(2299.99));

        let below = PriceAlert {
            direction: AlertDirection::Below,
            ..alert
        };
        assert!(below.is_triggered_by(2300.0));
        assert!(below.is_triggered_by(2299.99));
        assert!(!below.is_triggered_by(2300.01));
    }
}
