use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Store error: {0}")]
    Store(#[from] vigil_store::StoreError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] vigil_scheduler::SchedulerError),

    #[error("Market error: {0}")]
    Market(#[from] vigil_market::MarketError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] vigil_calendar::CalendarError),

    #[error("Fan-out error: {0}")]
    Fanout(#[from] vigil_notify::FanoutError),
}

pub type Result<T> = std::result::Result<T, JobError>;
