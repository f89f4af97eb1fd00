use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MarketError, Result};
use crate::types::{FrameSeries, PriceResponse};

/// Frame request covering the timeframes the analysis prompt works over.
pub const ANALYSIS_FRAMES: &str = "1m:35,5m:70,15m:5,1h:30,4h:25,1d:1";
/// Frame request for the evaluator: one bar is enough for the latest price.
pub const LATEST_FRAMES: &str = "1m:1";

/// Read access to asset price series.
///
/// One implementation wraps the HTTP price API; tests substitute their own.
#[async_trait]
pub trait PriceGateway: Send + Sync {
    /// Fetch candle series for `asset`. `frames` is the API's
    /// `timeframe:count` list, e.g. `"1m:35,1h:30"`.
    async fn fetch(&self, asset: &str, frames: &str) -> Result<FrameSeries>;

    /// Latest price of `asset`: the live quote of the newest 1m bar, or its
    /// close when no live quote is attached.
    async fn latest_price(&self, asset: &str) -> Result<f64> {
        let series = self.fetch(asset, LATEST_FRAMES).await?;
        series
            .get("1m")
            .and_then(|bars| bars.last())
            .map(|bar| bar.latest())
            .ok_or_else(|| MarketError::NoData {
                asset: asset.to_string(),
            })
    }
}

/// `PriceGateway` over the HTTP price API.
pub struct HttpPriceGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPriceGateway {
    /// Build a gateway with its own request timeout; a stalled price fetch
    /// fails this unit of work only.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceGateway for HttpPriceGateway {
    async fn fetch(&self, asset: &str, frames: &str) -> Result<FrameSeries> {
        let asset = asset.to_uppercase();
        debug!(%asset, frames, "fetching candles");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("asset", asset.as_str()), ("frames", frames)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: PriceResponse = response.json().await?;
        if parsed.data.is_empty() {
            return Err(MarketError::NoData { asset });
        }
        Ok(parsed.data)
    }
}
