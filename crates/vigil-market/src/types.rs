use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One OHLCV bar as returned by the price API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    /// Present on the newest bar of a live frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

impl Candle {
    /// The freshest price this bar knows: the live quote when present,
    /// otherwise the close.
    pub fn latest(&self) -> f64 {
        self.current_price.unwrap_or(self.close)
    }
}

/// Candle series keyed by timeframe label (`"1m"`, `"1h"`, ...), each
/// ordered oldest first.
pub type FrameSeries = HashMap<String, Vec<Candle>>;

/// Wire envelope of the price API: `{"data": {"1m": [...], ...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PriceResponse {
    #[serde(default)]
    pub data: FrameSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_latest_prefers_live_quote() {
        let mut candle = Candle {
            time: 1_700_000_000,
            open: 2290.0,
            high: 2305.0,
            low: 2288.0,
            close: 2299.5,
            volume: 1234.0,
            current_price: None,
        };
        assert_eq!(candle.latest(), 2299.5);
        candle.current_price = Some(2301.25);
        assert_eq!(candle.latest(), 2301.25);
    }

    #[test]
    fn wire_envelope_deserializes() {
        let json = r#"{"data":{"1m":[{"time":1,"open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":10.0,"current_price":1.6}]}}"#;
        let resp: PriceResponse = serde_json::from_str(json).unwrap();
        let bars = &resp.data["1m"];
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].latest(), 1.6);
    }

    #[test]
    fn missing_volume_defaults_to_zero() {
        let json = r#"{"time":1,"open":1.0,"high":2.0,"low":0.5,"close":1.5}"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(candle.volume, 0.0);
    }
}
