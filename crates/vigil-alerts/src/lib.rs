//! `vigil-alerts` — the periodic price-alert evaluation sweep.

pub mod error;
pub mod evaluator;

pub use error::{AlertError, Result};
pub use evaluator::{PriceAlertEvaluator, SweepSummary};
