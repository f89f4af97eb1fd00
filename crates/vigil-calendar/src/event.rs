use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Reported market impact of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    None,
    Low,
    Medium,
    High,
}

impl Impact {
    /// Parse the site's impact label; anything unrecognised counts as None.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Low" => Impact::Low,
            "Medium" => Impact::Medium,
            "High" => Impact::High,
            _ => Impact::None,
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Impact::None => "None",
            Impact::Low => "Low",
            Impact::Medium => "Medium",
            Impact::High => "High",
        };
        write!(f, "{s}")
    }
}

/// One upcoming calendar event, timezone-normalized to the reference zone.
///
/// Ephemeral: produced fresh per scrape, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomicEvent {
    pub timestamp: DateTime<Tz>,
    pub currency: String,
    pub title: String,
    pub impact: Impact,
    pub previous: String,
    pub forecast: String,
    pub actual: String,
}
