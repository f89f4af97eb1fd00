use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Interval between price-alert evaluation ticks.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
/// Reference timezone for the economic calendar and the daily digest.
pub const REFERENCE_TIMEZONE: &str = "Asia/Baghdad";

/// Top-level config (vigil.toml + VIGIL_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VigilConfig {
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Chat IDs that receive operator failure summaries.
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub schedules: SchedulesConfig,
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            telegram: None,
            database: DatabaseConfig::default(),
            admin_ids: Vec::new(),
            market: MarketConfig::default(),
            calendar: CalendarConfig::default(),
            schedules: SchedulesConfig::default(),
        }
    }
}

impl VigilConfig {
    /// Load config: explicit path > VIGIL_CONFIG env > ~/.vigil/vigil.toml.
    /// Env vars prefixed VIGIL_ override file values.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: VigilConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("VIGIL_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Price / candle API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_price_api_url")]
    pub price_api_url: String,
    /// Per-request timeout for price fetches.
    #[serde(default = "default_market_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            price_api_url: default_price_api_url(),
            request_timeout_secs: default_market_timeout(),
        }
    }
}

/// Economic calendar source and row filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_url")]
    pub url: String,
    /// Sent as the User-Agent header — the calendar site rejects bare clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_target_currencies")]
    pub target_currencies: Vec<String>,
    /// Impact levels worth reporting. Rows below this are dropped.
    #[serde(default = "default_acceptable_impacts")]
    pub acceptable_impacts: Vec<String>,
    #[serde(default = "default_calendar_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            url: default_calendar_url(),
            user_agent: default_user_agent(),
            target_currencies: default_target_currencies(),
            acceptable_impacts: default_acceptable_impacts(),
            fetch_timeout_secs: default_calendar_timeout(),
        }
    }
}

/// Built-in job timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulesConfig {
    /// Seconds between price-alert sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Daily calendar digest fire time, in `digest_timezone`.
    #[serde(default = "default_digest_hour")]
    pub digest_hour: u8,
    #[serde(default)]
    pub digest_minute: u8,
    #[serde(default = "default_digest_timezone")]
    pub digest_timezone: String,
}

impl Default for SchedulesConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            digest_hour: default_digest_hour(),
            digest_minute: 0,
            digest_timezone: default_digest_timezone(),
        }
    }
}

impl SchedulesConfig {
    /// Resolve `digest_timezone` to a chrono-tz zone.
    pub fn digest_tz(&self) -> crate::error::Result<chrono_tz::Tz> {
        self.digest_timezone
            .parse()
            .map_err(|_| crate::error::CoreError::UnknownTimezone(self.digest_timezone.clone()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.vigil/vigil.toml", home)
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.vigil/vigil.db", home)
}

fn default_price_api_url() -> String {
    "https://abalahb.cfd/forex".to_string()
}

fn default_market_timeout() -> u64 {
    10
}

fn default_calendar_url() -> String {
    "https://www.myfxbook.com/forex-economic-calendar".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_target_currencies() -> Vec<String> {
    vec!["USD".to_string(), "EUR".to_string()]
}

fn default_acceptable_impacts() -> Vec<String> {
    vec!["Medium".to_string(), "High".to_string()]
}

fn default_calendar_timeout() -> u64 {
    20
}

fn default_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

fn default_digest_hour() -> u8 {
    2
}

fn default_digest_timezone() -> String {
    REFERENCE_TIMEZONE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let cfg = VigilConfig::default();
        assert!(cfg.telegram.is_none());
        assert!(cfg.admin_ids.is_empty());
        assert_eq!(cfg.market.price_api_url, "https://abalahb.cfd/forex");
        assert_eq!(cfg.calendar.target_currencies, vec!["USD", "EUR"]);
        assert_eq!(cfg.schedules.sweep_interval_secs, 60);
        assert_eq!(cfg.schedules.digest_hour, 2);
    }

    #[test]
    fn digest_timezone_resolves() {
        let cfg = SchedulesConfig::default();
        assert_eq!(cfg.digest_tz().unwrap(), chrono_tz::Asia::Baghdad);
    }

    #[test]
    fn bogus_timezone_is_an_error() {
        let cfg = SchedulesConfig {
            digest_timezone: "Mars/Olympus_Mons".into(),
            ..SchedulesConfig::default()
        };
        assert!(cfg.digest_tz().is_err());
    }
}
