//! Stats endpoint integration: one blocking GET per run, grouped by date.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{DailyRecord, DateRange};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api3.adsterratools.com/publisher/stats.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("adstats/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "X-API-Key";
const ERROR_BODY_LIMIT: usize = 200;

/// Why a fetch produced no data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("API key rejected or expired (HTTP 401/403).")]
    Unauthorized,

    #[error("Rate limited by the stats API (HTTP 429). Try again later.")]
    RateLimited,

    #[error("Request rejected by the stats API: {0}")]
    Validation(String),

    #[error("Stats API failed with HTTP status {0}.")]
    Server(u16),

    #[error("Network error talking to the stats API: {0}")]
    Network(String),

    #[error("Malformed stats API response: {0}")]
    MalformedResponse(String),
}

/// Source of daily records for a date window.
pub trait Fetcher {
    fn fetch(&self, range: DateRange) -> Result<Vec<DailyRecord>, FetchError>;
}

/// Connection settings for [`StatsClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Read settings from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("ADSTATS_API_KEY")
            .map_err(|_| AppError::config("Missing ADSTATS_API_KEY in environment (.env)."))?;
        let base_url =
            std::env::var("ADSTATS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match std::env::var("ADSTATS_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::config(format!("Invalid ADSTATS_TIMEOUT_SECS '{raw}' (expected seconds)."))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub struct StatsClient {
    client: Client,
    config: ClientConfig,
}

impl StatsClient {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

impl Fetcher for StatsClient {
    fn fetch(&self, range: DateRange) -> Result<Vec<DailyRecord>, FetchError> {
        let start = range.start.format("%Y-%m-%d").to_string();
        let finish = range.end.format("%Y-%m-%d").to_string();
        info!(%start, %finish, "requesting daily stats");
        debug!(endpoint = %self.config.base_url, timeout = ?self.config.timeout);

        let started = Instant::now();
        let resp = self
            .client
            .get(&self.config.base_url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(ACCEPT, "application/json")
            .query(&[
                ("start_date", start.as_str()),
                ("finish_date", finish.as_str()),
                ("group_by", "date"),
            ])
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        debug!(status, elapsed = ?started.elapsed(), "response received");

        if !resp.status().is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body = resp
            .text()
            .map_err(|e| FetchError::Network(format!("failed to read response body: {e}")))?;
        let records = parse_envelope(&body)?;

        info!(records = records.len(), elapsed = ?started.elapsed(), "daily stats received");
        Ok(records)
    }
}

/// Map a non-success HTTP status to a fetch failure.
pub fn status_error(status: u16, body: &str) -> FetchError {
    match status {
        401 | 403 => FetchError::Unauthorized,
        429 => FetchError::RateLimited,
        400 | 422 => {
            let body = body.trim();
            if body.is_empty() {
                FetchError::Validation(format!("HTTP {status}, check the date range"))
            } else {
                FetchError::Validation(format!("HTTP {status}: {}", truncate(body, ERROR_BODY_LIMIT)))
            }
        }
        other => FetchError::Server(other),
    }
}

#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    items: Option<Vec<RawItem>>,
    #[serde(default)]
    errors: Value,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    date: Option<String>,
    #[serde(default)]
    impression: Value,
    cpm: Option<f64>,
    revenue: Option<f64>,
}

/// Decode a stats response body into unique, date-ascending records.
///
/// Items without a valid `YYYY-MM-DD` date are skipped. When a date appears
/// more than once the later item wins.
pub fn parse_envelope(body: &str) -> Result<Vec<DailyRecord>, FetchError> {
    let envelope: StatsEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    if has_errors(&envelope.errors) {
        return Err(FetchError::Validation(errors_text(&envelope.errors)));
    }

    let items = envelope
        .items
        .ok_or_else(|| FetchError::MalformedResponse("missing `items` array".to_string()))?;

    let mut by_date: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();
    for item in items {
        let Some(raw_date) = item.date.as_deref() else {
            warn!("skipping stats item without a date");
            continue;
        };
        let date = match NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                warn!(date = raw_date, error = %e, "skipping stats item with invalid date");
                continue;
            }
        };

        let Some(impressions) = impression_count(&item.impression) else {
            warn!(%date, impression = %item.impression, "skipping stats item with invalid impression count");
            continue;
        };

        let record = DailyRecord {
            date,
            impressions,
            cpm: item.cpm.unwrap_or(0.0),
            revenue: item.revenue.unwrap_or(0.0),
        };
        if by_date.insert(date, record).is_some() {
            warn!(%date, "duplicate stats item, keeping the later one");
        }
    }

    Ok(by_date.into_values().collect())
}

/// Impression count from an integer, an integral float, or a numeric string.
///
/// Missing or `null` counts are zero; fractional floats are truncated.
/// Negative, non-finite, and non-numeric values yield `None`.
fn impression_count(raw: &Value) -> Option<u64> {
    match raw {
        Value::Null => Some(0),
        Value::Number(n) => n.as_u64().or_else(|| whole_count(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| whole_count(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

fn whole_count(v: f64) -> Option<u64> {
    if v.is_finite() && v >= 0.0 && v < u64::MAX as f64 {
        Some(v.trunc() as u64)
    } else {
        None
    }
}

fn has_errors(errors: &Value) -> bool {
    match errors {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_none_or(|v| v != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn errors_text(errors: &Value) -> String {
    match errors {
        Value::String(s) => s.trim().to_string(),
        other => truncate(&other.to_string(), ERROR_BODY_LIMIT),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
