//! JSON export document.
//!
//! The document has two sections:
//! - `meta`: period bounds, financial/traffic summaries, and the best day
//! - `daily_stats`: one minimal `{date, impression, cpm, revenue}` row per day
//!
//! Field names and nesting are a stable, consumer-facing format.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::DailyRecord;
use crate::error::AppError;
use crate::report::Report;

const CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub meta: ExportMeta,
    pub daily_stats: Vec<DailyRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMeta {
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub generated_at: String,
    pub period: ExportPeriod,
    pub financial_summary: FinancialSummary,
    pub traffic_summary: TrafficSummary,
    pub highlights: Highlights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days_active: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_revenue_usd: f64,
    pub average_daily_revenue: f64,
    /// Mean of the reported daily CPM, not traffic-weighted.
    pub average_cpm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSummary {
    pub total_impressions: u64,
    pub average_daily_impressions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    pub best_performing_day: BestDay,
    pub currency: String,
}

/// Best day highlight; `{"date": null, "revenue": -1.0}` when there is no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestDay {
    pub date: Option<NaiveDate>,
    pub revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
}

impl BestDay {
    fn from_record(record: Option<&DailyRecord>) -> Self {
        match record {
            Some(r) => Self {
                date: Some(r.date),
                revenue: r.revenue,
                cpm: Some(r.cpm),
            },
            None => Self {
                date: None,
                revenue: -1.0,
                cpm: None,
            },
        }
    }
}

impl ExportDocument {
    /// Build the export for a report's fetch window.
    pub fn from_report(report: &Report, generated_at: NaiveDateTime) -> Self {
        let summary = &report.overall;
        Self {
            meta: ExportMeta {
                generated_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                period: ExportPeriod {
                    start: report.window.start,
                    end: report.window.end,
                    total_days_active: summary.active_days,
                },
                financial_summary: FinancialSummary {
                    total_revenue_usd: summary.total_revenue,
                    average_daily_revenue: summary.average_daily_revenue,
                    average_cpm: summary.average_reported_cpm,
                },
                traffic_summary: TrafficSummary {
                    total_impressions: summary.total_impressions,
                    average_daily_impressions: summary.average_daily_impressions(),
                },
                highlights: Highlights {
                    best_performing_day: BestDay::from_record(report.best_day.as_ref()),
                    currency: CURRENCY.to_string(),
                },
            },
            daily_stats: report.records(),
        }
    }
}

/// Pretty-printed (2-space indent) JSON text.
pub fn to_json_string(doc: &ExportDocument) -> Result<String, AppError> {
    serde_json::to_string_pretty(doc)
        .map_err(|e| AppError::config(format!("Failed to serialize export JSON: {e}")))
}

/// File name for an export written at `timestamp`.
pub fn export_file_name(timestamp: NaiveDateTime) -> String {
    format!("adstats_clean_{}.json", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write `doc` into `dir` (created if missing) and return the file path.
pub fn write_export_json(
    dir: &Path,
    doc: &ExportDocument,
    timestamp: NaiveDateTime,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| {
        AppError::config(format!("Failed to create export directory '{}': {e}", dir.display()))
    })?;

    let path = dir.join(export_file_name(timestamp));
    let file = File::create(&path)
        .map_err(|e| AppError::config(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, doc)
        .map_err(|e| AppError::config(format!("Failed to write export JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::config(format!("Failed to write export JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush export JSON: {e}")))?;

    info!(path = %path.display(), days = doc.daily_stats.len(), "export written");
    Ok(path)
}

/// Read an export file back (used to inspect previous runs).
pub fn read_export_json(path: &Path) -> Result<ExportDocument, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open export JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid export JSON: {e}")))
}
