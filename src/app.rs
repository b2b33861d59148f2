//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration (flags over environment)
//! - runs the fetch + aggregation pipeline
//! - prints tables or JSON
//! - writes optional exports

use std::io::Write;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use clap::Parser;

use crate::cli::{Command, CommonArgs, ShowArgs};
use crate::data::ClientConfig;
use crate::domain::{OutputFormat, Policy, ReportConfig};
use crate::error::AppError;
use crate::io::{ExportDocument, read_export_json, to_json_string, write_export_json};
use crate::report::{Palette, Report, format_export_notice, format_report};

pub mod pipeline;

/// Entry point for the `adstats` binary.
pub fn run() -> Result<(), AppError> {
    // We want `adstats` and `adstats --date ...` to behave like `adstats half-month ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::AllTime(args) => handle_report(Policy::AllTime { since: args.since }, &args.common),
        Command::Rolling(args) => {
            handle_report(Policy::RollingWindow { days: args.days }, &args.common)
        }
        Command::Monthly(args) => {
            handle_report(Policy::MonthlyGrouped { days: args.days }, &args.common)
        }
        Command::HalfMonth(args) => handle_report(Policy::HalfMonthSplit, &args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_report(policy: Policy, args: &CommonArgs) -> Result<(), AppError> {
    let config = report_config_from_args(policy, args, Utc::now().date_naive());
    let client_config = client_config_from_args(args, ClientConfig::from_env()?);

    let report = pipeline::run_report(&config, client_config)?;
    emit(&mut std::io::stdout().lock(), &report, &config, Local::now().naive_local())
}

/// Write the optional export, then print the report in the configured format.
///
/// Rendering and the export both happen before anything reaches `out`, so a
/// failed export leaves no partial output behind.
fn emit<W: Write>(
    out: &mut W,
    report: &Report,
    config: &ReportConfig,
    generated_at: NaiveDateTime,
) -> Result<(), AppError> {
    let doc = ExportDocument::from_report(report, generated_at);

    let rendered = match config.output_format {
        OutputFormat::Table => format_report(report, &Palette::from_env(config.color)),
        OutputFormat::Json => to_json_string(&doc)?,
    };

    let exported = match &config.export_dir {
        Some(dir) => Some(write_export_json(dir, &doc, generated_at)?),
        None => None,
    };

    writeln!(out, "{rendered}")
        .map_err(|e| AppError::config(format!("Failed to write report: {e}")))?;

    if let Some(path) = exported {
        eprintln!("Export saved: {}", path.display());
        eprintln!("{}", format_export_notice(&report.overall, report.best_day.as_ref()));
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let doc = read_export_json(&args.file)?;
    let policy = Policy::AllTime {
        since: doc.meta.period.start,
    };
    let report = Report::build(&doc.daily_stats, policy, doc.meta.period.end);

    println!("Export generated at {}", doc.meta.generated_at);
    println!("{}", format_report(&report, &Palette::from_env(!args.no_color)));
    Ok(())
}

pub fn report_config_from_args(policy: Policy, args: &CommonArgs, today_utc: NaiveDate) -> ReportConfig {
    ReportConfig {
        policy,
        reference_date: args.date.unwrap_or(today_utc),
        output_format: args.format,
        export_dir: args.export_dir.clone(),
        color: !args.no_color,
    }
}

/// Apply CLI overrides on top of environment settings.
pub fn client_config_from_args(args: &CommonArgs, mut base: ClientConfig) -> ClientConfig {
    if let Some(url) = &args.base_url {
        base.base_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        base.timeout = Duration::from_secs(secs);
    }
    base
}

/// Rewrite argv so `adstats` defaults to `adstats half-month`.
///
/// Rules:
/// - `adstats`                       -> `adstats half-month`
/// - `adstats --date 2026-02-20 ...` -> `adstats half-month --date 2026-02-20 ...`
/// - `adstats --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("half-month".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "all-time" | "rolling" | "monthly" | "half-month" | "show"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "half-month flags".
    if arg1.starts_with('-') {
        argv.insert(1, "half-month".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn common(list: &[&str]) -> CommonArgs {
        let mut argv = vec!["adstats", "half-month"];
        argv.extend_from_slice(list);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::HalfMonth(common) => common,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_invocation_is_half_month() {
        assert_eq!(rewrite_args(args(&["adstats"])), args(&["adstats", "half-month"]));
    }

    #[test]
    fn leading_flags_go_to_half_month() {
        assert_eq!(
            rewrite_args(args(&["adstats", "--date", "2026-02-20"])),
            args(&["adstats", "half-month", "--date", "2026-02-20"])
        );
    }

    #[test]
    fn help_and_subcommands_are_untouched() {
        assert_eq!(rewrite_args(args(&["adstats", "--help"])), args(&["adstats", "--help"]));
        assert_eq!(
            rewrite_args(args(&["adstats", "rolling", "--days", "7"])),
            args(&["adstats", "rolling", "--days", "7"])
        );
    }

    #[test]
    fn reference_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let config = report_config_from_args(Policy::HalfMonthSplit, &common(&[]), today);
        assert_eq!(config.reference_date, today);
        assert!(config.color);

        let config = report_config_from_args(
            Policy::HalfMonthSplit,
            &common(&["--date", "2026-02-20", "--no-color", "--format", "json"]),
            today,
        );
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
        assert!(!config.color);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    fn rolling_report() -> Report {
        let records = vec![crate::domain::DailyRecord {
            date: NaiveDate::from_ymd_opt(2026, 2, 19).unwrap(),
            impressions: 2000,
            cpm: 0.5,
            revenue: 1.0,
        }];
        Report::build(
            &records,
            Policy::RollingWindow { days: 7 },
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
        )
    }

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 20)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn failed_export_prints_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = report_config_from_args(
            Policy::RollingWindow { days: 7 },
            &common(&["--no-color"]),
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
        );
        config.export_dir = Some(blocker);

        let mut out = Vec::new();
        let err = emit(&mut out, &rolling_report(), &config, generated()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
        assert!(out.is_empty());
    }

    #[test]
    fn successful_export_then_prints_report() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = report_config_from_args(
            Policy::RollingWindow { days: 7 },
            &common(&["--no-color", "--format", "json"]),
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
        );
        config.export_dir = Some(tmp.path().join("out"));

        let mut out = Vec::new();
        emit(&mut out, &rolling_report(), &config, generated()).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("\"daily_stats\""));
        assert!(tmp.path().join("out/adstats_clean_20260220_080000.json").is_file());
    }

    #[test]
    fn cli_overrides_client_settings() {
        let base = ClientConfig {
            api_key: "k".to_string(),
            base_url: "https://example.invalid/stats.json".to_string(),
            timeout: Duration::from_secs(30),
        };
        let merged = client_config_from_args(
            &common(&["--base-url", "http://localhost:9000/stats.json", "--timeout", "5"]),
            base.clone(),
        );
        assert_eq!(merged.base_url, "http://localhost:9000/stats.json");
        assert_eq!(merged.timeout, Duration::from_secs(5));
        assert_eq!(merged.api_key, "k");

        let untouched = client_config_from_args(&common(&[]), base);
        assert_eq!(untouched.timeout, Duration::from_secs(30));
    }
}
