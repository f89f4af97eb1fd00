use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use vigil_core::job::{FiredJob, JobKind};

use crate::error::{Result, SchedulerError};
use crate::trigger::{next_run, Trigger};

#[derive(Debug, Clone)]
struct Entry {
    trigger: Trigger,
    kind: JobKind,
    next_run: DateTime<Utc>,
}

/// The live schedule plus its polling loop.
///
/// Cheap to clone — all clones share one entry map, so admin handlers can
/// schedule/unschedule while the engine loop runs. Due jobs are pushed over
/// the fired channel with `try_send`, never blocking the tick.
#[derive(Clone)]
pub struct SchedulerCore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    fired_tx: mpsc::Sender<FiredJob>,
}

impl SchedulerCore {
    pub fn new(fired_tx: mpsc::Sender<FiredJob>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            fired_tx,
        }
    }

    /// Register a job, atomically replacing any existing entry with the same
    /// id. There is never more than one live trigger per id.
    pub fn schedule(&self, job_id: &str, trigger: Trigger, kind: JobKind) -> Result<()> {
        let next = next_run(&trigger, Utc::now()).ok_or_else(|| SchedulerError::InvalidTrigger {
            job_id: job_id.to_string(),
            reason: format!("{trigger:?} has no future fire time"),
        })?;

        let replaced = self
            .entries
            .lock()
            .unwrap()
            .insert(
                job_id.to_string(),
                Entry {
                    trigger,
                    kind,
                    next_run: next,
                },
            )
            .is_some();

        if replaced {
            info!(job_id = %job_id, next = %next, "job replaced");
        } else {
            info!(job_id = %job_id, next = %next, "job scheduled");
        }
        Ok(())
    }

    /// Remove the live trigger. No-op when the id is absent.
    pub fn unschedule(&self, job_id: &str) {
        if self.entries.lock().unwrap().remove(job_id).is_some() {
            info!(job_id = %job_id, "job unscheduled");
        }
    }

    /// Align the live schedule with the persisted set: stale entries are
    /// removed, missing ones added, changed ones replaced. Entries whose
    /// trigger and payload already match are left untouched, so running
    /// reconcile twice is a no-op.
    pub fn reconcile(&self, persisted: &[(String, Trigger, JobKind)]) {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();

        let keep: std::collections::HashSet<&str> =
            persisted.iter().map(|(id, _, _)| id.as_str()).collect();
        let before = entries.len();
        entries.retain(|id, _| keep.contains(id.as_str()));
        let removed = before - entries.len();

        let mut added = 0usize;
        for (job_id, trigger, kind) in persisted {
            let unchanged = entries
                .get(job_id)
                .is_some_and(|e| e.trigger == *trigger && e.kind == *kind);
            if unchanged {
                continue;
            }
            match next_run(trigger, now) {
                Some(next) => {
                    entries.insert(
                        job_id.clone(),
                        Entry {
                            trigger: trigger.clone(),
                            kind: kind.clone(),
                            next_run: next,
                        },
                    );
                    added += 1;
                }
                None => {
                    error!(job_id = %job_id, "persisted job has an unsatisfiable trigger — skipped");
                }
            }
        }
        info!(total = entries.len(), added, removed, "schedule reconciled");
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.entries.lock().unwrap().contains_key(job_id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Sorted ids of every live entry.
    pub fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// The next planned fire instant, if the job is live.
    pub fn next_run_of(&self, job_id: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().unwrap().get(job_id).map(|e| e.next_run)
    }

    /// Polling loop. Checks due times every second until `shutdown`
    /// broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("scheduler loop started");
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick(Utc::now());
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler loop shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Fire every entry whose `next_run` has arrived and re-arm it.
    ///
    /// Entries are collected under the lock but sent after it is released;
    /// `try_send` keeps the loop non-blocking even when the router lags.
    fn tick(&self, now: DateTime<Utc>) {
        let mut due: Vec<FiredJob> = Vec::new();
        {
            let mut entries = self.entries.lock().unwrap();
            let mut exhausted: Vec<String> = Vec::new();
            for (job_id, entry) in entries.iter_mut() {
                if entry.next_run > now {
                    continue;
                }
                due.push(FiredJob {
                    job_id: job_id.clone(),
                    kind: entry.kind.clone(),
                });
                match next_run(&entry.trigger, now) {
                    Some(next) => entry.next_run = next,
                    None => exhausted.push(job_id.clone()),
                }
            }
            for job_id in exhausted {
                warn!(job_id = %job_id, "trigger exhausted — entry removed");
                entries.remove(&job_id);
            }
        }

        for fired in due {
            info!(job_id = %fired.job_id, kind = fired.kind.label(), "job fired");
            if self.fired_tx.try_send(fired.clone()).is_err() {
                warn!(job_id = %fired.job_id, "dispatch channel full or closed — firing dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn core() -> (SchedulerCore, mpsc::Receiver<FiredJob>) {
        let (tx, rx) = mpsc::channel(16);
        (SchedulerCore::new(tx), rx)
    }

    fn daily(hour: u8, minute: u8) -> Trigger {
        Trigger::Daily {
            hour,
            minute,
            tz: chrono_tz::UTC,
        }
    }

    #[test]
    fn schedule_twice_keeps_one_entry_with_latest_params() {
        let (core, _rx) = core();
        core.schedule("task_XAUUSD_8_30", daily(8, 30), JobKind::AlertSweep)
            .unwrap();
        core.schedule(
            "task_XAUUSD_8_30",
            daily(9, 0),
            JobKind::AnalysisBroadcast {
                asset: "XAUUSD".into(),
            },
        )
        .unwrap();

        assert_eq!(core.len(), 1);
        let next = core.next_run_of("task_XAUUSD_8_30").unwrap();
        let in_tz = next.with_timezone(&chrono_tz::UTC);
        assert_eq!(
            (chrono::Timelike::hour(&in_tz), chrono::Timelike::minute(&in_tz)),
            (9, 0)
        );
    }

    #[test]
    fn unschedule_is_a_no_op_when_absent() {
        let (core, _rx) = core();
        core.unschedule("ghost");
        assert!(core.is_empty());
    }

    #[test]
    fn reconcile_from_empty_matches_persisted_set() {
        let (core, _rx) = core();
        let persisted = vec![
            (
                "task_XAUUSD_8_30".to_string(),
                daily(8, 30),
                JobKind::AnalysisBroadcast {
                    asset: "XAUUSD".into(),
                },
            ),
            (
                "task_EURUSD_14_0".to_string(),
                daily(14, 0),
                JobKind::AnalysisBroadcast {
                    asset: "EURUSD".into(),
                },
            ),
        ];
        core.reconcile(&persisted);
        assert_eq!(core.job_ids(), vec!["task_EURUSD_14_0", "task_XAUUSD_8_30"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let (core, _rx) = core();
        let persisted = vec![(
            "task_XAUUSD_8_30".to_string(),
            daily(8, 30),
            JobKind::AnalysisBroadcast {
                asset: "XAUUSD".into(),
            },
        )];
        core.reconcile(&persisted);
        let first = core.next_run_of("task_XAUUSD_8_30").unwrap();

        core.reconcile(&persisted);
        assert_eq!(core.job_ids(), vec!["task_XAUUSD_8_30"]);
        // Unchanged entries keep their armed fire time.
        assert_eq!(core.next_run_of("task_XAUUSD_8_30").unwrap(), first);
    }

    #[test]
    fn reconcile_removes_stale_and_updates_changed() {
        let (core, _rx) = core();
        core.schedule("stale", daily(1, 0), JobKind::AlertSweep)
            .unwrap();
        core.schedule(
            "kept",
            daily(2, 0),
            JobKind::AnalysisBroadcast {
                asset: "XAUUSD".into(),
            },
        )
        .unwrap();

        let persisted = vec![(
            "kept".to_string(),
            daily(3, 0),
            JobKind::AnalysisBroadcast {
                asset: "XAUUSD".into(),
            },
        )];
        core.reconcile(&persisted);

        assert_eq!(core.job_ids(), vec!["kept"]);
        let next = core.next_run_of("kept").unwrap();
        assert_eq!(chrono::Timelike::hour(&next.with_timezone(&chrono_tz::UTC)), 3);
    }

    #[tokio::test]
    async fn tick_fires_due_jobs_and_rearms() {
        let (core, mut rx) = core();
        core.schedule("sweep", Trigger::Every { secs: 60 }, JobKind::AlertSweep)
            .unwrap();
        let armed = core.next_run_of("sweep").unwrap();

        // Not yet due: nothing fires.
        core.tick(armed - Duration::seconds(1));
        assert!(rx.try_recv().is_err());

        core.tick(armed);
        let fired = rx.try_recv().unwrap();
        assert_eq!(fired.job_id, "sweep");
        assert_eq!(fired.kind, JobKind::AlertSweep);
        assert_eq!(core.next_run_of("sweep").unwrap(), armed + Duration::seconds(60));
    }

    #[tokio::test]
    async fn one_fire_per_due_window() {
        let (core, mut rx) = core();
        core.schedule("sweep", Trigger::Every { secs: 60 }, JobKind::AlertSweep)
            .unwrap();
        let armed = core.next_run_of("sweep").unwrap();

        core.tick(armed);
        core.tick(armed + Duration::seconds(1));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "job must not double-fire in one window");
    }
}
