//! Daily economic calendar digest.

use chrono::NaiveDate;
use tracing::{info, warn};

use vigil_calendar::{CalendarScraper, EconomicEvent, Impact};
use vigil_notify::{fan_out, FanoutReport, NotificationSink};
use vigil_store::Store;

use crate::error::Result;

const NO_EVENTS_MESSAGE: &str = "🗓️ *Daily Economic Calendar*\n\n\
    No significant economic events (Medium or High impact) scheduled for \
    today or tomorrow.";

/// Scrape the calendar and fan the rendered digest out to every recipient.
///
/// `today` is the current date in the calendar's reference zone; it decides
/// the Today/Tomorrow section labels.
pub async fn run_digest_job(
    scraper: &CalendarScraper,
    store: &Store,
    sink: &dyn NotificationSink,
    today: NaiveDate,
) -> Result<FanoutReport> {
    info!("running daily calendar digest");

    let events = scraper.fetch().await?;
    let message = if events.is_empty() {
        NO_EVENTS_MESSAGE.to_string()
    } else {
        render_digest(&events, today)
    };

    let recipients = store.all_recipients()?;
    if recipients.is_empty() {
        warn!("no recipients — digest not sent");
        return Ok(FanoutReport {
            delivered: 0,
            failed: 0,
            outcomes: Vec::new(),
        });
    }

    let report = fan_out(sink, &recipients, &message).await?;
    info!(
        events = events.len(),
        delivered = report.delivered,
        failed = report.failed,
        "calendar digest sent"
    );
    Ok(report)
}

/// Render sorted events into the digest text, grouped by day.
///
/// The transport sink chunks anything over its size limit, so this renders
/// the full list without truncation.
pub fn render_digest(events: &[EconomicEvent], today: NaiveDate) -> String {
    let mut text = String::from(
        "🗓️ *Daily Economic Calendar (Baghdad Time)*\n\nKey events for today and tomorrow:\n",
    );

    let mut current_day = "";
    for event in events {
        let event_date = event.timestamp.date_naive();
        let day_label = if event_date == today { "Today" } else { "Tomorrow" };
        if day_label != current_day {
            current_day = day_label;
            text.push_str(&format!(
                "\n--- *{day_label} - {}* ---\n",
                event_date.format("%A, %d %B")
            ));
        }

        let marker = if event.impact == Impact::High {
            "🔴"
        } else {
            "🟠"
        };
        text.push_str(&format!(
            "\n{marker} *{}*\n  ⏰ {} | Currency: {}\n  📊 Prev: `{}` | Forecast: `{}` | Actual: `{}`\n",
            event.title,
            event.timestamp.format("%H:%M"),
            event.currency,
            event.previous,
            event.forecast,
            event.actual,
        ));
    }
    text
}
