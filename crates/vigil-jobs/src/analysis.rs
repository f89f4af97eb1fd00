//! Scheduled asset analysis broadcast to the VIP set.

use tracing::{info, warn};

use vigil_market::{gateway::ANALYSIS_FRAMES, AnalysisProvider, PriceGateway};
use vigil_notify::{fan_out, FanoutReport, NotificationSink};
use vigil_store::Store;

use crate::error::Result;

/// Run one analysis broadcast: candles → recommendation → VIP fan-out.
///
/// Any provider or gateway failure propagates to the caller (the router),
/// which reports it to the admin channel; there is no same-tick retry.
pub async fn run_analysis_job(
    asset: &str,
    gateway: &dyn PriceGateway,
    provider: &dyn AnalysisProvider,
    store: &Store,
    sink: &dyn NotificationSink,
) -> Result<FanoutReport> {
    info!(asset, "running scheduled analysis");

    let candles = gateway.fetch(asset, ANALYSIS_FRAMES).await?;
    let recommendation = provider.analyze(asset, &candles).await?;

    let vips = store.vip_recipients()?;
    if vips.is_empty() {
        warn!(asset, "no VIP recipients — analysis not broadcast");
        return Ok(FanoutReport {
            delivered: 0,
            failed: 0,
            outcomes: Vec::new(),
        });
    }

    let message = format!("📊 *Automated VIP Analysis for {asset}*\n\n{recommendation}");
    let report = fan_out(sink, &vips, &message).await?;
    info!(
        asset,
        delivered = report.delivered,
        failed = report.failed,
        "analysis broadcast complete"
    );
    Ok(report)
}
