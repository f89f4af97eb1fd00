use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Price API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("No price data for {asset}")]
    NoData { asset: String },

    #[error("Analysis provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, MarketError>;
