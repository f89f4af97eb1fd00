use async_trait::async_trait;

use crate::error::Result;
use crate::types::FrameSeries;

/// External analysis collaborator — an AI or rules engine that turns candle
/// data into a recommendation text.
///
/// Prompt construction and response parsing belong to the implementation;
/// the job runner only needs the finished message. The daemon wires a null
/// implementation when no provider is configured.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Provider name for logging and operator failure reports.
    fn name(&self) -> &str;

    /// Produce a broadcast-ready analysis of `asset` from its candles.
    async fn analyze(&self, asset: &str, candles: &FrameSeries) -> Result<String>;
}
