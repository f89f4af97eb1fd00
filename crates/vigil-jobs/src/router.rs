//! Dispatch router — turns fired scheduler entries into running job bodies.
//!
//! Receives [`FiredJob`]s from the scheduler's mpsc channel and spawns each
//! body as its own task, injecting the live collaborators at dispatch time.
//! A failing or panicking body is logged (and, for the composite jobs,
//! reported to the admin channel) and never disturbs the loop or its
//! siblings.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info};

use vigil_alerts::PriceAlertEvaluator;
use vigil_calendar::CalendarScraper;
use vigil_core::{FiredJob, JobKind};
use vigil_market::{AnalysisProvider, PriceGateway};
use vigil_notify::NotificationSink;
use vigil_store::Store;

use crate::analysis::run_analysis_job;
use crate::digest::run_digest_job;

#[derive(Clone)]
pub struct JobRouter {
    store: Store,
    gateway: Arc<dyn PriceGateway>,
    provider: Arc<dyn AnalysisProvider>,
    scraper: Arc<CalendarScraper>,
    sink: Arc<dyn NotificationSink>,
    evaluator: Arc<PriceAlertEvaluator>,
    admin_ids: Arc<Vec<i64>>,
}

impl JobRouter {
    pub fn new(
        store: Store,
        gateway: Arc<dyn PriceGateway>,
        provider: Arc<dyn AnalysisProvider>,
        scraper: Arc<CalendarScraper>,
        sink: Arc<dyn NotificationSink>,
        evaluator: Arc<PriceAlertEvaluator>,
        admin_ids: Vec<i64>,
    ) -> Self {
        Self {
            store,
            gateway,
            provider,
            scraper,
            sink,
            evaluator,
            admin_ids: Arc::new(admin_ids),
        }
    }

    /// Drain the fired-job channel for the lifetime of the process.
    ///
    /// Each job body runs in its own task so a slow scrape or analysis
    /// never delays the next firing.
    pub async fn run(self, mut rx: mpsc::Receiver<FiredJob>) {
        info!("job router started");
        while let Some(fired) = rx.recv().await {
            let router = self.clone();
            let job_id = fired.job_id.clone();
            let body = tokio::spawn(async move { router.dispatch(fired).await });
            tokio::spawn(async move {
                if let Err(e) = body.await {
                    error!(job_id = %job_id, "job body aborted: {e}");
                }
            });
        }
        info!("job router exiting (channel closed)");
    }

    async fn dispatch(&self, fired: FiredJob) {
        match fired.kind {
            JobKind::AlertSweep => {
                if let Err(e) = self.evaluator.run_sweep().await {
                    error!(job_id = %fired.job_id, "alert sweep failed: {e}");
                }
            }

            JobKind::AnalysisBroadcast { asset } => {
                match run_analysis_job(
                    &asset,
                    self.gateway.as_ref(),
                    self.provider.as_ref(),
                    &self.store,
                    self.sink.as_ref(),
                )
                .await
                {
                    Ok(report) => info!(
                        job_id = %fired.job_id,
                        delivered = report.delivered,
                        failed = report.failed,
                        "analysis job finished"
                    ),
                    Err(e) => {
                        error!(job_id = %fired.job_id, asset = %asset, "analysis job failed: {e}");
                        self.report_to_admins(&format!(
                            "🚨 Scheduled analysis for *{asset}* failed!\n*Error:* `{e}`"
                        ))
                        .await;
                    }
                }
            }

            JobKind::CalendarDigest => {
                let today = Utc::now()
                    .with_timezone(&chrono_tz::Asia::Baghdad)
                    .date_naive();
                match run_digest_job(&self.scraper, &self.store, self.sink.as_ref(), today).await {
                    Ok(report) if report.delivered > 0 => {
                        self.report_to_admins(&format!(
                            "✅ Daily economic calendar sent to {} recipients.",
                            report.delivered
                        ))
                        .await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(job_id = %fired.job_id, "calendar digest failed: {e}");
                        self.report_to_admins(&format!(
                            "🚨 Daily calendar digest failed!\n*Error:* `{e}`"
                        ))
                        .await;
                    }
                }
            }
        }
    }

    /// Operator notifications. Per-admin failures are logged, never raised.
    async fn report_to_admins(&self, text: &str) {
        for &admin in self.admin_ids.iter() {
            if let Err(e) = self.sink.send(admin, text).await {
                error!(admin, "failed to notify admin: {e}");
            }
        }
    }
}
