use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use vigil_alerts::PriceAlertEvaluator;
use vigil_calendar::{CalendarScraper, Impact};
use vigil_core::{FiredJob, JobKind, VigilConfig};
use vigil_jobs::{JobManager, JobRouter};
use vigil_market::{AnalysisProvider, FrameSeries, HttpPriceGateway, PriceGateway};
use vigil_notify::{NotificationSink, SinkError};
use vigil_scheduler::{SchedulerCore, Trigger};
use vigil_store::Store;
use vigil_telegram::TelegramSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info".into()),
        )
        .init();

    // load config: explicit path > VIGIL_CONFIG env > ~/.vigil/vigil.toml
    let config_path = std::env::var("VIGIL_CONFIG").ok();
    let config = VigilConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        VigilConfig::default()
    });

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");
    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = Store::new(conn)?;

    // Fired-job channel: scheduler loop → dispatch router
    let (fired_tx, fired_rx) = tokio::sync::mpsc::channel::<FiredJob>(256);
    let scheduler = SchedulerCore::new(fired_tx);

    // External collaborators
    let gateway: Arc<dyn PriceGateway> = Arc::new(HttpPriceGateway::new(
        &config.market.price_api_url,
        Duration::from_secs(config.market.request_timeout_secs),
    )?);
    let provider = build_provider();
    let scraper = Arc::new(CalendarScraper::new(
        &config.calendar.url,
        &config.calendar.user_agent,
        config.calendar.target_currencies.clone(),
        config
            .calendar
            .acceptable_impacts
            .iter()
            .map(|s| Impact::parse(s))
            .collect(),
        Duration::from_secs(config.calendar.fetch_timeout_secs),
    )?);
    let sink: Arc<dyn NotificationSink> = match config.telegram {
        Some(ref telegram) => {
            info!("Telegram sink configured");
            Arc::new(TelegramSink::new(&telegram.bot_token))
        }
        None => {
            warn!("No Telegram bot token configured — notifications will be dropped");
            Arc::new(NullSink)
        }
    };

    let evaluator = Arc::new(PriceAlertEvaluator::new(
        store.clone(),
        gateway.clone(),
        sink.clone(),
    ));
    let manager = JobManager::new(store.clone(), scheduler.clone());

    // Startup reconciliation: the live schedule becomes exactly the
    // persisted job set. Built-in jobs are registered afterwards.
    let seeded = manager.reconcile()?;
    info!(jobs = seeded, "schedule reconciled from store");

    scheduler.schedule(
        "price_alert_sweep",
        Trigger::Every {
            secs: config.schedules.sweep_interval_secs,
        },
        JobKind::AlertSweep,
    )?;
    scheduler.schedule(
        "daily_calendar_digest",
        Trigger::Daily {
            hour: config.schedules.digest_hour,
            minute: config.schedules.digest_minute,
            tz: config.schedules.digest_tz()?,
        },
        JobKind::CalendarDigest,
    )?;

    let router = JobRouter::new(
        store,
        gateway,
        provider,
        scraper,
        sink,
        evaluator,
        config.admin_ids.clone(),
    );
    tokio::spawn(router.run(fired_rx));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(scheduler.clone().run(shutdown_rx));

    info!("vigil daemon running");
    tokio::signal::ctrl_c().await?;

    let _ = shutdown_tx.send(true);
    info!("shutting down");
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

/// Analysis provider selection.
///
/// The AI collaborator lives outside this repo; until one is wired in via
/// config, scheduled analyses fail cleanly through the null provider and
/// the admins are told why.
fn build_provider() -> Arc<dyn AnalysisProvider> {
    warn!("No analysis provider configured — analysis jobs will report failure");
    Arc::new(NullAnalysisProvider)
}

/// Placeholder provider when no analysis backend is available.
struct NullAnalysisProvider;

#[async_trait::async_trait]
impl AnalysisProvider for NullAnalysisProvider {
    fn name(&self) -> &str {
        "null"
    }
    async fn analyze(&self, _asset: &str, _candles: &FrameSeries) -> vigil_market::Result<String> {
        Err(vigil_market::MarketError::Provider(
            "no analysis provider configured".into(),
        ))
    }
}

/// Sink used when no transport is configured; drops everything loudly.
struct NullSink;

#[async_trait::async_trait]
impl NotificationSink for NullSink {
    async fn send(&self, recipient: i64, _text: &str) -> Result<(), SinkError> {
        warn!(recipient, "no transport configured — notification dropped");
        Ok(())
    }
}
