//! Scheduled-job persistence. These rows are the source of truth the live
//! scheduler is reconciled against at startup.

use chrono::Utc;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::types::ScheduledJob;
use crate::Store;

impl Store {
    /// Insert a job, or overwrite the row with the same id (last write wins).
    pub fn upsert_job(&self, job: &ScheduledJob) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO scheduled_jobs (job_id, asset, hour, minute, timezone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(job_id) DO UPDATE SET
                asset = excluded.asset,
                hour = excluded.hour,
                minute = excluded.minute,
                timezone = excluded.timezone",
            rusqlite::params![
                job.job_id,
                job.asset,
                job.hour,
                job.minute,
                job.timezone,
                Utc::now().to_rfc3339(),
            ],
        )?;
        info!(job_id = %job.job_id, asset = %job.asset, "job persisted");
        Ok(())
    }

    /// Delete a job row. Returns `JobNotFound` if no row is deleted.
    pub fn remove_job(&self, job_id: &str) -> Result<()> {
        let conn = self.conn();
        let n = conn.execute("DELETE FROM scheduled_jobs WHERE job_id = ?1", [job_id])?;
        if n == 0 {
            return Err(StoreError::JobNotFound {
                id: job_id.to_string(),
            });
        }
        info!(job_id = %job_id, "job removed");
        Ok(())
    }

    /// All persisted jobs, oldest first.
    pub fn list_jobs(&self) -> Result<Vec<ScheduledJob>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT job_id, asset, hour, minute, timezone
             FROM scheduled_jobs ORDER BY created_at",
        )?;
        let jobs = stmt
            .query_map([], |row| {
                Ok(ScheduledJob {
                    job_id: row.get(0)?,
                    asset: row.get(1)?,
                    hour: row.get::<_, u32>(2)? as u8,
                    minute: row.get::<_, u32>(3)? as u8,
                    timezone: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(jobs)
    }

    pub fn job_by_id(&self, job_id: &str) -> Result<Option<ScheduledJob>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT job_id, asset, hour, minute, timezone
             FROM scheduled_jobs WHERE job_id = ?1",
        )?;
        let mut rows = stmt.query_map([job_id], |row| {
            Ok(ScheduledJob {
                job_id: row.get(0)?,
                asset: row.get(1)?,
                hour: row.get::<_, u32>(2)? as u8,
                minute: row.get::<_, u32>(3)? as u8,
                timezone: row.get(4)?,
            })
        })?;
        Ok(rows.next().transpose()?)
    }
}
