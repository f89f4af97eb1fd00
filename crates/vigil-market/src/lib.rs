//! `vigil-market` — price data and asset analysis seams.
//!
//! The core never talks to a market endpoint directly: the evaluator and
//! the analysis job consume the [`PriceGateway`] and [`AnalysisProvider`]
//! traits, and the daemon decides which implementations to wire in.

pub mod analysis;
pub mod error;
pub mod gateway;
pub mod types;

pub use analysis::AnalysisProvider;
pub use error::{MarketError, Result};
pub use gateway::{HttpPriceGateway, PriceGateway};
pub use types::{Candle, FrameSeries};
