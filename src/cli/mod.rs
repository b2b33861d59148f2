//! Command-line parsing for the ad revenue stats reporter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_ALL_TIME_START, OutputFormat};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "adstats", version, about = "Ad network revenue reports by period")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Every day since the account start date.
    AllTime(AllTimeArgs),
    /// A rolling window ending today (7 gives an 8-day view including today).
    Rolling(RollingArgs),
    /// Daily rows plus per-month totals over a lookback window.
    Monthly(MonthlyArgs),
    /// Previous half-month, current half-month through yesterday, and today live.
    HalfMonth(CommonArgs),
    /// Summarize a previously exported JSON file.
    Show(ShowArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AllTimeArgs {
    /// First day of the account history.
    #[arg(long, default_value = DEFAULT_ALL_TIME_START, value_parser = parse_date)]
    pub since: NaiveDate,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct RollingArgs {
    /// Days to look back from the reference date.
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct MonthlyArgs {
    /// Days to look back from the reference date.
    #[arg(long, default_value_t = 90)]
    pub days: u32,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options shared by every report.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Reference "today" (YYYY-MM-DD). Defaults to the current UTC date.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Also write the JSON export into this directory.
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Override the stats endpoint URL (otherwise ADSTATS_BASE_URL or the default).
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (otherwise ADSTATS_TIMEOUT_SECS or 30).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Options for summarizing a saved export.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Export JSON produced with `--export-dir`.
    #[arg(value_name = "JSON")]
    pub file: PathBuf,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{raw}': {e}"))
}
