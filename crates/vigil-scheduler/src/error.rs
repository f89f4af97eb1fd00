use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The trigger can never produce a future fire time.
    #[error("Invalid trigger for job {job_id}: {reason}")]
    InvalidTrigger { job_id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
