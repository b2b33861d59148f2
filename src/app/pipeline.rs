//! Shared "report pipeline" logic used by every report subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch window -> fetch -> classify -> summarize
//!
//! The subcommands can then focus on presentation (table vs JSON).

use tracing::info;

use crate::aggregate::fetch_window;
use crate::data::{ClientConfig, Fetcher, StatsClient};
use crate::domain::ReportConfig;
use crate::error::AppError;
use crate::report::Report;

/// Execute the full pipeline against the live stats endpoint.
pub fn run_report(config: &ReportConfig, client_config: ClientConfig) -> Result<Report, AppError> {
    let client = StatsClient::new(client_config)?;
    run_report_with(&client, config)
}

/// Execute the pipeline with any record source.
///
/// Fetch failures abort the run; an empty result is a normal, empty report.
pub fn run_report_with<F: Fetcher>(fetcher: &F, config: &ReportConfig) -> Result<Report, AppError> {
    // 1) Resolve the window to request.
    let window = fetch_window(&config.policy, config.reference_date);
    if window.is_empty() {
        return Err(AppError::config(format!(
            "Start date {} is after the reference date {}.",
            window.start, window.end
        )));
    }

    // 2) Fetch. One request, no retry.
    let records = fetcher.fetch(window)?;
    if records.is_empty() {
        info!(%window, "no data for this range");
    }

    // 3) Classify + summarize.
    Ok(Report::build(&records, config.policy, config.reference_date))
}
