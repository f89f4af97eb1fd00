use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Calendar fetch failed ({status})")]
    Status { status: u16 },

    #[error("Invalid selector: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
