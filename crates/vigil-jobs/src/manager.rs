//! Admin-facing job management.
//!
//! Every operation writes the store and the live schedule together: the
//! store row is the durable truth, the scheduler entry its projection.
//! Store mutations serialize on the connection mutex, so two admins racing
//! on the same id resolve to last-write-wins with exactly one live trigger.

use tracing::info;

use vigil_core::JobKind;
use vigil_scheduler::{SchedulerCore, Trigger};
use vigil_store::{ScheduledJob, Store, StoreError};

use crate::error::Result;

#[derive(Clone)]
pub struct JobManager {
    store: Store,
    scheduler: SchedulerCore,
}

impl JobManager {
    pub fn new(store: Store, scheduler: SchedulerCore) -> Self {
        Self { store, scheduler }
    }

    /// Create (or overwrite) a recurring analysis job for `asset` at
    /// HH:MM in `timezone`.
    pub fn add_analysis_job(
        &self,
        asset: &str,
        hour: u8,
        minute: u8,
        timezone: &str,
    ) -> Result<ScheduledJob> {
        let job = ScheduledJob::new(asset, hour, minute, timezone)?;
        self.store.upsert_job(&job)?;
        self.scheduler
            .schedule(&job.job_id, trigger_of(&job), kind_of(&job))?;
        info!(job_id = %job.job_id, "analysis job added");
        Ok(job)
    }

    /// Remove the live trigger and the persisted row.
    pub fn remove_job(&self, job_id: &str) -> Result<()> {
        self.scheduler.unschedule(job_id);
        self.store.remove_job(job_id)?;
        Ok(())
    }

    /// Move an existing job to a new fire time.
    ///
    /// The id encodes (asset, hour, minute), so a time change is a
    /// replace: the new row and trigger go in first, then the old ones
    /// are dropped.
    pub fn update_job(&self, job_id: &str, hour: u8, minute: u8) -> Result<ScheduledJob> {
        let existing = self
            .store
            .job_by_id(job_id)?
            .ok_or_else(|| StoreError::JobNotFound {
                id: job_id.to_string(),
            })?;

        let updated = ScheduledJob::new(&existing.asset, hour, minute, &existing.timezone)?;
        self.store.upsert_job(&updated)?;
        self.scheduler
            .schedule(&updated.job_id, trigger_of(&updated), kind_of(&updated))?;

        if updated.job_id != existing.job_id {
            self.scheduler.unschedule(&existing.job_id);
            self.store.remove_job(&existing.job_id)?;
        }
        info!(from = %existing.job_id, to = %updated.job_id, "analysis job rescheduled");
        Ok(updated)
    }

    pub fn list_jobs(&self) -> Result<Vec<ScheduledJob>> {
        Ok(self.store.list_jobs()?)
    }

    /// Startup reconciliation: make the live schedule set-equal to the
    /// persisted jobs. Built-in jobs are registered separately afterwards.
    pub fn reconcile(&self) -> Result<usize> {
        let persisted: Vec<(String, Trigger, JobKind)> = self
            .store
            .list_jobs()?
            .iter()
            .map(|job| (job.job_id.clone(), trigger_of(job), kind_of(job)))
            .collect();
        self.scheduler.reconcile(&persisted);
        Ok(persisted.len())
    }
}

fn trigger_of(job: &ScheduledJob) -> Trigger {
    Trigger::Daily {
        hour: job.hour,
        minute: job.minute,
        tz: job.tz(),
    }
}

fn kind_of(job: &ScheduledJob) -> JobKind {
    JobKind::AnalysisBroadcast {
        asset: job.asset.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn manager() -> JobManager {
        let store = Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        let (tx, _rx) = mpsc::channel(16);
        JobManager::new(store, SchedulerCore::new(tx))
    }

    #[test]
    fn add_persists_and_arms_the_trigger() {
        let m = manager();
        let job = m.add_analysis_job("xauusd", 8, 30, "Asia/Baghdad").unwrap();
        assert_eq!(job.job_id, "task_XAUUSD_8_30");
        assert_eq!(m.list_jobs().unwrap().len(), 1);
        assert!(m.scheduler.contains("task_XAUUSD_8_30"));
    }

    #[test]
    fn adding_the_same_slot_twice_keeps_one_job() {
        let m = manager();
        m.add_analysis_job("XAUUSD", 8, 30, "Asia/Baghdad").unwrap();
        m.add_analysis_job("XAUUSD", 8, 30, "UTC").unwrap();

        assert_eq!(m.list_jobs().unwrap().len(), 1);
        assert_eq!(m.scheduler.len(), 1);
        assert_eq!(m.list_jobs().unwrap()[0].timezone, "UTC");
    }

    #[test]
    fn remove_drops_row_and_trigger() {
        let m = manager();
        let job = m.add_analysis_job("XAUUSD", 8, 30, "UTC").unwrap();
        m.remove_job(&job.job_id).unwrap();

        assert!(m.list_jobs().unwrap().is_empty());
        assert!(!m.scheduler.contains(&job.job_id));
    }

    #[test]
    fn remove_unknown_job_errors_without_side_effects() {
        let m = manager();
        assert!(m.remove_job("task_GHOST_1_0").is_err());
    }

    #[test]
    fn update_moves_the_job_to_the_new_slot() {
        let m = manager();
        let job = m.add_analysis_job("XAUUSD", 8, 30, "UTC").unwrap();
        let updated = m.update_job(&job.job_id, 9, 15).unwrap();

        assert_eq!(updated.job_id, "task_XAUUSD_9_15");
        let jobs = m.list_jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!((jobs[0].hour, jobs[0].minute), (9, 15));
        assert!(m.scheduler.contains("task_XAUUSD_9_15"));
        assert!(!m.scheduler.contains("task_XAUUSD_8_30"));
    }

    #[test]
    fn reconcile_rebuilds_the_live_schedule_from_rows() {
        let m = manager();
        m.add_analysis_job("XAUUSD", 8, 30, "UTC").unwrap();
        m.add_analysis_job("EURUSD", 14, 0, "UTC").unwrap();

        // Simulate a restart: a fresh scheduler with a stale leftover.
        let (tx, _rx) = mpsc::channel(16);
        let fresh = JobManager::new(m.store.clone(), SchedulerCore::new(tx));
        fresh
            .scheduler
            .schedule("task_STALE_0_0", trigger_of(&ScheduledJob::new("STALE", 0, 0, "UTC").unwrap()), JobKind::AlertSweep)
            .unwrap();

        assert_eq!(fresh.reconcile().unwrap(), 2);
        assert_eq!(
            fresh.scheduler.job_ids(),
            vec!["task_EURUSD_14_0", "task_XAUUSD_8_30"]
        );

        // Idempotent on immediate re-run.
        assert_eq!(fresh.reconcile().unwrap(), 2);
        assert_eq!(fresh.scheduler.len(), 2);
    }
}
