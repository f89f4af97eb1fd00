use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Defines when and how often a job fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Fire every day at HH:MM wall-clock time in `tz`.
    ///
    /// A job set to 02:00 Asia/Baghdad fires at the Baghdad-local instant
    /// regardless of the host timezone.
    Daily { hour: u8, minute: u8, tz: Tz },

    /// Fire repeatedly with a fixed interval in seconds.
    Every { secs: u64 },
}

/// Compute the next UTC fire instant for `trigger` strictly after `after`.
///
/// Returns `None` for triggers that can never fire (zero interval,
/// out-of-range time).
pub fn next_run(trigger: &Trigger, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match trigger {
        Trigger::Every { secs } => {
            if *secs == 0 {
                return None;
            }
            Some(after + Duration::seconds(*secs as i64))
        }

        Trigger::Daily { hour, minute, tz } => {
            if *hour > 23 || *minute > 59 {
                return None;
            }
            // Walk forward from today in the job's zone. A couple of extra
            // days covers DST gaps where the local HH:MM does not exist.
            let mut date = after.with_timezone(tz).date_naive();
            for _ in 0..3 {
                if let Some(candidate) = tz
                    .with_ymd_and_hms(
                        date.year(),
                        date.month(),
                        date.day(),
                        *hour as u32,
                        *minute as u32,
                        0,
                    )
                    .earliest()
                {
                    let candidate = candidate.with_timezone(&Utc);
                    if candidate > after {
                        return Some(candidate);
                    }
                }
                date = date.succ_opt()?;
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn interval_advances_by_its_period() {
        let after = utc("2024-01-15T12:00:00Z");
        let next = next_run(&Trigger::Every { secs: 60 }, after).unwrap();
        assert_eq!(next, utc("2024-01-15T12:01:00Z"));
    }

    #[test]
    fn zero_interval_never_fires() {
        assert!(next_run(&Trigger::Every { secs: 0 }, Utc::now()).is_none());
    }

    #[test]
    fn daily_fires_at_local_wall_clock_time() {
        // 02:00 Asia/Baghdad is 23:00 UTC the previous day (UTC+3, no DST).
        let trigger = Trigger::Daily {
            hour: 2,
            minute: 0,
            tz: chrono_tz::Asia::Baghdad,
        };
        let next = next_run(&trigger, utc("2024-01-15T12:00:00Z")).unwrap();
        assert_eq!(next, utc("2024-01-15T23:00:00Z"));
    }

    #[test]
    fn daily_later_today_stays_on_today() {
        // 20:30 Baghdad = 17:30 UTC, still ahead of 12:00 UTC.
        let trigger = Trigger::Daily {
            hour: 20,
            minute: 30,
            tz: chrono_tz::Asia::Baghdad,
        };
        let next = next_run(&trigger, utc("2024-01-15T12:00:00Z")).unwrap();
        assert_eq!(next, utc("2024-01-15T17:30:00Z"));
    }

    #[test]
    fn daily_at_exact_fire_time_advances_a_day() {
        // next_run is strictly after `after` — re-arming at the fire instant
        // must not fire the same slot twice.
        let trigger = Trigger::Daily {
            hour: 2,
            minute: 0,
            tz: chrono_tz::UTC,
        };
        let next = next_run(&trigger, utc("2024-01-15T02:00:00Z")).unwrap();
        assert_eq!(next, utc("2024-01-16T02:00:00Z"));
    }

    #[test]
    fn daily_skips_nonexistent_dst_local_time() {
        // US DST: 2024-03-10 02:30 does not exist in New York; the next
        // valid fire is the day after.
        let trigger = Trigger::Daily {
            hour: 2,
            minute: 30,
            tz: chrono_tz::America::New_York,
        };
        let next = next_run(&trigger, utc("2024-03-10T01:00:00Z")).unwrap();
        assert_eq!(
            next.with_timezone(&chrono_tz::America::New_York)
                .date_naive()
                .to_string(),
            "2024-03-11"
        );
    }

    #[test]
    fn daily_out_of_range_time_is_rejected() {
        let trigger = Trigger::Daily {
            hour: 24,
            minute: 0,
            tz: chrono_tz::UTC,
        };
        assert!(next_run(&trigger, Utc::now()).is_none());
    }

    #[test]
    fn trigger_round_trips_through_json() {
        let trigger = Trigger::Daily {
            hour: 8,
            minute: 30,
            tz: chrono_tz::Asia::Baghdad,
        };
        let json = serde_json::to_string(&trigger).unwrap();
        let back: Trigger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trigger);
    }
}
