use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, warn};

use vigil_market::PriceGateway;
use vigil_notify::NotificationSink;
use vigil_store::{PriceAlert, Store};

use crate::error::Result;

/// Aggregate counts of one sweep, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub evaluated: usize,
    pub triggered: usize,
    pub deactivated: usize,
    pub price_failures: usize,
    pub send_failures: usize,
}

/// Periodic evaluation of all active price alerts.
///
/// One sweep: read the distinct asset set, fetch every latest price
/// concurrently, evaluate each active alert against its asset's price,
/// notify owners of triggered alerts, then deactivate the fired one-time
/// alerts in a single batched write.
pub struct PriceAlertEvaluator {
    store: Store,
    gateway: Arc<dyn PriceGateway>,
    sink: Arc<dyn NotificationSink>,
}

impl PriceAlertEvaluator {
    pub fn new(store: Store, gateway: Arc<dyn PriceGateway>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            gateway,
            sink,
        }
    }

    /// Run one evaluation sweep.
    ///
    /// A failed price fetch sidelines that asset's alerts for this sweep
    /// only. A failed notification is counted but never rolls back the
    /// alert's state — delivery failure is not evaluation failure.
    pub async fn run_sweep(&self) -> Result<SweepSummary> {
        let mut summary = SweepSummary::default();

        let assets = self.store.distinct_active_assets()?;
        if assets.is_empty() {
            return Ok(summary);
        }

        let prices = self.fetch_prices(&assets, &mut summary).await;
        if prices.is_empty() {
            info!("no prices available this sweep");
            return Ok(summary);
        }

        let alerts = self.store.active_alerts()?;
        summary.evaluated = alerts.len();

        let fired: Vec<(&PriceAlert, f64)> = alerts
            .iter()
            .filter_map(|alert| {
                let price = *prices.get(&alert.asset)?;
                alert.is_triggered_by(price).then_some((alert, price))
            })
            .collect();
        summary.triggered = fired.len();

        // Owner notifications go out concurrently; each failure is isolated.
        let sink = &self.sink;
        let sends = fired.iter().map(|&(alert, price)| async move {
            let message = render_trigger_message(alert, price);
            let result = sink.send(alert.owner_id, &message).await;
            if let Err(ref e) = result {
                warn!(
                    alert_id = alert.id,
                    owner_id = alert.owner_id,
                    error = %e,
                    "alert notification failed — alert state unchanged"
                );
            }
            result
        });
        summary.send_failures = join_all(sends)
            .await
            .iter()
            .filter(|r| r.is_err())
            .count();

        // Batched after the full sweep: an alert cannot double-fire within
        // one tick, and a crash before this write re-fires on restart
        // (at-least-once, accepted).
        let one_time_ids: Vec<i64> = fired
            .iter()
            .filter(|(alert, _)| alert.is_one_time)
            .map(|(alert, _)| alert.id)
            .collect();
        summary.deactivated = self.store.deactivate_alerts(&one_time_ids)?;

        info!(
            evaluated = summary.evaluated,
            triggered = summary.triggered,
            deactivated = summary.deactivated,
            send_failures = summary.send_failures,
            "alert sweep complete"
        );
        Ok(summary)
    }

    /// Latest price per asset, fetched concurrently. Failures are logged and
    /// the asset is skipped for this sweep only.
    async fn fetch_prices(
        &self,
        assets: &[String],
        summary: &mut SweepSummary,
    ) -> HashMap<String, f64> {
        let gateway = &self.gateway;
        let fetches = assets.iter().map(|asset| async move {
            (asset.clone(), gateway.latest_price(asset).await)
        });

        let mut prices = HashMap::new();
        for (asset, result) in join_all(fetches).await {
            match result {
                Ok(price) => {
                    prices.insert(asset, price);
                }
                Err(e) => {
                    summary.price_failures += 1;
                    warn!(asset = %asset, error = %e, "price fetch failed — retried next sweep");
                }
            }
        }
        prices
    }
}

fn render_trigger_message(alert: &PriceAlert, price: f64) -> String {
    let repeat_note = if alert.is_one_time {
        "This was a one-time alert and has been deactivated."
    } else {
        "This is a recurring alert and will trigger again."
    };
    format!(
        "🔔 *Price Alert!*\n\n\
         The price of *{}* has reached `{:.4}`!\n\
         This matches your alert for a price {} `{}`.\n\n\
         *Note:* {}",
        alert.asset, price, alert.direction, alert.target_price, repeat_note
    )
}
