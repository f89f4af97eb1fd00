use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{CalendarError, Result};
use crate::event::{EconomicEvent, Impact};

/// All event timestamps are normalized to this zone, and the today/tomorrow
/// window is evaluated in it, regardless of host locale.
const REFERENCE_TZ: Tz = chrono_tz::Asia::Baghdad;

/// Scrapes the economic calendar.
///
/// Stateless between calls — every `fetch()` re-downloads and re-parses the
/// whole page.
pub struct CalendarScraper {
    client: reqwest::Client,
    url: String,
    target_currencies: Vec<String>,
    acceptable_impacts: Vec<Impact>,
}

impl CalendarScraper {
    pub fn new(
        url: &str,
        user_agent: &str,
        target_currencies: Vec<String>,
        acceptable_impacts: Vec<Impact>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            target_currencies,
            acceptable_impacts,
        })
    }

    /// Download the calendar page and extract the filtered, sorted event
    /// list for today and tomorrow (reference time).
    pub async fn fetch(&self) -> Result<Vec<EconomicEvent>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status {
                status: status.as_u16(),
            });
        }
        let html = response.text().await?;
        debug!(bytes = html.len(), "calendar page fetched");
        self.parse(&html, Utc::now())
    }

    /// Parse a calendar document. `now` anchors the today/tomorrow window
    /// and the assumed year, both evaluated in the reference zone.
    ///
    /// Malformed rows are logged and skipped; only a broken selector (a
    /// programming error) fails the whole parse.
    pub fn parse(&self, html: &str, now: DateTime<Utc>) -> Result<Vec<EconomicEvent>> {
        let document = Html::parse_document(html);

        let row_sel = selector("tr.economicCalendarRow")?;
        let date_sel = selector("div[data-calendardatetd]")?;
        let cell_sel = selector("td")?;
        let impact_sel = selector("div")?;
        let previous_sel = selector("td[data-previous]")?;
        let forecast_sel = selector("td[data-concensus]")?;
        let actual_sel = selector("td[data-actual]")?;

        let local_now = now.with_timezone(&REFERENCE_TZ);
        let today = local_now.date_naive();
        let Some(tomorrow) = today.succ_opt() else {
            return Ok(Vec::new());
        };

        let mut events: Vec<EconomicEvent> = Vec::new();
        for row in document.select(&row_sel) {
            let Some(date_str) = row.select(&date_sel).next().map(cell_text) else {
                continue;
            };

            let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
            if cells.len() < 6 {
                continue;
            }
            let currency = cell_text(cells[3]);
            let title = cell_text(cells[4]);
            let impact = cells[5]
                .select(&impact_sel)
                .find(|div| div.value().classes().any(|c| c.starts_with("impact_")))
                .map(|div| Impact::parse(&cell_text(div)))
                .unwrap_or(Impact::None);

            if !self.target_currencies.iter().any(|c| c == &currency)
                || !self.acceptable_impacts.contains(&impact)
            {
                continue;
            }

            let Some(timestamp) = parse_event_datetime(&date_str, local_now.year()) else {
                warn!(date = %date_str, "calendar row has unparseable date — skipped");
                continue;
            };
            let event_date = timestamp.date_naive();
            if event_date != today && event_date != tomorrow {
                continue;
            }

            events.push(EconomicEvent {
                timestamp,
                currency,
                title,
                impact,
                previous: attr_text(row, &previous_sel, "N/A"),
                forecast: attr_text(row, &forecast_sel, "N/A"),
                actual: attr_text(row, &actual_sel, "Not released"),
            });
        }

        events.sort_by_key(|e| e.timestamp);
        debug!(count = events.len(), "calendar events parsed");
        Ok(events)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CalendarError::Selector(format!("{css}: {e:?}")))
}

fn cell_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text of the first `sel` match inside `row`, or `fallback` when the cell
/// is missing or empty.
fn attr_text(row: ElementRef, sel: &Selector, fallback: &str) -> String {
    row.select(sel)
        .next()
        .map(cell_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Parse a calendar date cell like `"Jan 5, 2:30PM"` or `"Jan 5, 14:30"`
/// into a reference-zone instant.
///
/// The site omits the year; the caller supplies the current one. The time
/// part is tried as 12-hour-with-suffix first, then 24-hour. A missing time
/// part means midnight.
fn parse_event_datetime(date_str: &str, year: i32) -> Option<DateTime<Tz>> {
    let mut parts = date_str.splitn(2, ',');
    let date_part = parts.next()?.trim();
    let time_part = parts.next().map(str::trim).unwrap_or("");

    let date = NaiveDate::parse_from_str(&format!("{date_part} {year}"), "%b %d %Y").ok()?;
    let time = if time_part.is_empty() {
        NaiveTime::from_hms_opt(0, 0, 0)?
    } else {
        NaiveTime::parse_from_str(&time_part.to_uppercase(), "%I:%M%p")
            .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
            .ok()?
    };

    REFERENCE_TZ.from_local_datetime(&date.and_time(time)).earliest()
}
