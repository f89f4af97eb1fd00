use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A job record failed constructor validation.
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// An alert record failed constructor validation.
    #[error("Invalid alert: {0}")]
    InvalidAlert(String),

    /// No job with the given ID exists in the store.
    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    /// No alert with the given ID exists in the store.
    #[error("Alert not found: {id}")]
    AlertNotFound { id: i64 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
