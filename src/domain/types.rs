//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - decoded from the stats endpoint
//! - bucketed and summarized in-memory
//! - exported to JSON

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Start of the account history used by the all-time view.
pub const DEFAULT_ALL_TIME_START: &str = "2022-10-01";

/// One calendar day of performance data.
///
/// `cpm` is reported by the source per day and is not always derivable from
/// `revenue / impressions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(rename = "impression")]
    pub impressions: u64,
    pub cpm: f64,
    pub revenue: f64,
}

/// An inclusive date range `[start, end]`.
///
/// A range whose `end` precedes `start` is valid and contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// A calendar month key (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Human-readable label for terminal output (e.g. `February 2026`).
    pub fn display_name(self) -> String {
        match self.first_day() {
            Some(d) => d.format("%B %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// How daily records are partitioned into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// One bucket from a fixed account start date through the reference date.
    AllTime { since: NaiveDate },
    /// One bucket covering `[reference - days, reference]`.
    RollingWindow { days: u32 },
    /// One bucket per year-month present in the data.
    ///
    /// `days` only drives the fetch window; grouping is by month key.
    MonthlyGrouped { days: u32 },
    /// Previous half-month, current half-month (through yesterday), and today.
    HalfMonthSplit,
}

impl Policy {
    /// Human-readable label for terminal output.
    pub fn display_name(&self) -> String {
        match self {
            Policy::AllTime { since } => format!("All time (since {since})"),
            Policy::RollingWindow { days } => format!("Last {days} days"),
            Policy::MonthlyGrouped { days } => format!("Monthly ({days} day lookback)"),
            Policy::HalfMonthSplit => "Half-month cycle (UTC)".to_string(),
        }
    }
}

/// Name of a bucket produced by classification.
///
/// The derived ordering is the report order: window, months ascending, then the
/// half-month buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketName {
    Window,
    Month(YearMonth),
    Previous,
    Current,
    Today,
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketName::Window => write!(f, "window"),
            BucketName::Month(ym) => write!(f, "{ym}"),
            BucketName::Previous => write!(f, "previous"),
            BucketName::Current => write!(f, "current"),
            BucketName::Today => write!(f, "today"),
        }
    }
}

/// Output format for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub policy: Policy,
    /// The "today" anchor for every relative date.
    pub reference_date: NaiveDate,
    pub output_format: OutputFormat,
    /// Directory for the timestamped JSON export, if requested.
    pub export_dir: Option<PathBuf>,
    pub color: bool,
}
