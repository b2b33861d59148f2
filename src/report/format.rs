//! Formatted terminal output for a [`Report`].
//!
//! We keep formatting code in one place so:
//! - aggregation stays free of display policy
//! - output changes are localized (important for snapshot-style tests)

use chrono::NaiveDate;

use crate::aggregate::Summary;
use crate::domain::{BucketName, DailyRecord, DateRange, Policy};
use crate::report::style::{Palette, Thresholds, Tone, cpm_tone, revenue_tone};
use crate::report::{BucketReport, Report};

const RULE_WIDTH: usize = 56;

/// A table cell: plain text plus the tone applied after padding.
struct Cell {
    text: String,
    tone: Tone,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
        }
    }

    fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Format the full report for the terminal.
pub fn format_report(report: &Report, palette: &Palette) -> String {
    let thresholds = Thresholds::for_policy(&report.policy);
    let mut out = String::new();

    out.push_str(&palette.paint(
        &format!("=== adstats - {} ===", report.policy.display_name()),
        Tone::Heading,
    ));
    out.push('\n');
    out.push_str(&format!(
        "Window: {} | reference date: {}\n",
        report.window, report.reference_date
    ));

    match report.policy {
        Policy::AllTime { .. } | Policy::RollingWindow { .. } => {
            out.push_str(&format_window(report, palette, &thresholds));
        }
        Policy::MonthlyGrouped { .. } => {
            out.push_str(&format_monthly(report, palette, &thresholds));
        }
        Policy::HalfMonthSplit => {
            out.push_str(&format_half_month(report, palette, &thresholds));
        }
    }

    out
}

fn format_window(report: &Report, palette: &Palette, thresholds: &Thresholds) -> String {
    let mut out = String::new();
    let Some(window) = report.bucket(BucketName::Window) else {
        return out;
    };

    out.push('\n');
    if window.bucket.is_empty() {
        out.push_str(&palette.paint("No data for this range.", Tone::Muted));
        out.push('\n');
        return out;
    }

    out.push_str(&format_daily_table(&window.bucket.records, palette, thresholds));
    out.push('\n');
    out.push_str(&section_header(&format!(
        "{} summary",
        report.policy.display_name()
    ), palette));

    let s = &window.summary;
    out.push_str(&format_pairs(
        &[
            ("Period", Cell::plain(format_range(s.range))),
            ("Active days", Cell::plain(s.active_days.to_string())),
            ("Total impressions", Cell::plain(format_count(s.total_impressions))),
            ("Avg revenue / day", Cell::plain(format_usd(s.average_daily_revenue))),
            ("Total revenue", Cell::toned(format_usd(s.total_revenue), Tone::Strong)),
        ],
        palette,
    ));
    out
}

fn format_monthly(report: &Report, palette: &Palette, thresholds: &Thresholds) -> String {
    let mut out = String::new();
    out.push('\n');

    let records = report.records();
    if records.is_empty() {
        out.push_str(&palette.paint("No data for this range.", Tone::Muted));
        out.push('\n');
        return out;
    }

    out.push_str(&format_daily_table(&records, palette, thresholds));
    out.push('\n');
    out.push_str(&section_header("Monthly performance", palette));

    // Newest month first.
    let months: Vec<&BucketReport> = report.buckets.iter().rev().collect();
    let rows: Vec<Vec<Cell>> = months
        .iter()
        .map(|m| {
            let label = match m.name {
                BucketName::Month(ym) => ym.display_name(),
                other => other.to_string(),
            };
            let s = &m.summary;
            vec![
                Cell::plain(label),
                Cell::plain(s.active_days.to_string()),
                Cell::plain(format_count(s.total_impressions)),
                Cell::toned(format_cpm(s.effective_cpm), Tone::Highlight),
                Cell::plain(format_usd(s.average_daily_revenue)),
                Cell::toned(format_usd(s.total_revenue), Tone::Strong),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["MONTH", "DAYS", "IMPRESSIONS", "EFF. CPM", "AVG / DAY", "REVENUE"],
        &rows,
        palette,
    ));

    out.push('\n');
    out.push_str(&format!(
        "Total across {} day(s): {}\n",
        report.overall.active_days,
        palette.paint(&format_usd(report.overall.total_revenue), Tone::Strong)
    ));
    out
}

fn format_half_month(report: &Report, palette: &Palette, thresholds: &Thresholds) -> String {
    let mut out = String::new();
    let Some(cycle) = report.cycle else {
        return out;
    };

    // [1] Previous period.
    out.push('\n');
    out.push_str(&section_header(
        &format!("[1] Previous period: {}", format_range(cycle.previous)),
        palette,
    ));
    match report.bucket(BucketName::Previous) {
        Some(prev) if !prev.bucket.is_empty() => {
            let s = &prev.summary;
            out.push_str(&format_pairs(
                &[
                    ("Total impressions", Cell::plain(format_count(s.total_impressions))),
                    ("Effective CPM", Cell::plain(format_cpm(s.effective_cpm))),
                    ("Avg revenue / day", Cell::plain(format_usd(s.average_daily_revenue))),
                    ("Total revenue", Cell::toned(format_usd(s.total_revenue), Tone::Strong)),
                ],
                palette,
            ));
        }
        _ => {
            out.push_str(&palette.paint("No data for the previous period.", Tone::Muted));
            out.push('\n');
        }
    }

    // [2] Current period, finalized days only.
    out.push('\n');
    out.push_str(&section_header(
        &format!(
            "[2] Current period: {} (final through yesterday)",
            format_range(cycle.current)
        ),
        palette,
    ));
    match report.bucket(BucketName::Current) {
        Some(curr) if !curr.bucket.is_empty() => {
            out.push_str(&format_daily_table(&curr.bucket.records, palette, thresholds));
            out.push_str("\nInterim estimate:\n");
            let s = &curr.summary;
            out.push_str(&format_pairs(
                &[
                    ("Total impressions", Cell::plain(format_count(s.total_impressions))),
                    ("Avg revenue / day", Cell::plain(format_usd(s.average_daily_revenue))),
                    ("Total revenue", Cell::toned(format_usd(s.total_revenue), Tone::Strong)),
                ],
                palette,
            ));
        }
        _ => {
            out.push_str(&palette.paint(
                "No finalized data for this period yet (start of cycle).",
                Tone::Muted,
            ));
            out.push('\n');
        }
    }

    // [3] Today, live.
    out.push('\n');
    out.push_str(&section_header(
        &format!("[3] Today (live, not final): {} UTC", format_day(cycle.today)),
        palette,
    ));
    match report
        .bucket(BucketName::Today)
        .and_then(|t| t.bucket.records.first())
    {
        Some(today) => {
            out.push_str(&format_pairs(
                &[
                    ("Impressions so far", Cell::plain(format_count(today.impressions))),
                    ("CPM (reported)", Cell::plain(format_cpm(today.cpm))),
                    ("Revenue so far", Cell::toned(format_usd(today.revenue), Tone::Strong)),
                ],
                palette,
            ));
        }
        None => {
            out.push_str(&palette.paint("No traffic recorded for today yet.", Tone::Muted));
            out.push('\n');
        }
    }

    out
}

/// Daily rows: date, impressions, reported CPM, revenue.
pub fn format_daily_table(records: &[DailyRecord], palette: &Palette, thresholds: &Thresholds) -> String {
    let rows: Vec<Vec<Cell>> = records
        .iter()
        .map(|r| {
            vec![
                Cell::plain(r.date.format("%Y-%m-%d").to_string()),
                Cell::plain(format_count(r.impressions)),
                Cell::toned(format_cpm(r.cpm), cpm_tone(r.cpm, thresholds)),
                Cell::toned(format_usd(r.revenue), revenue_tone(r.revenue, thresholds)),
            ]
        })
        .collect();
    render_table(&["DATE", "IMPRESSIONS", "CPM", "REVENUE"], &rows, palette)
}

/// One-line summary used after an export.
pub fn format_export_notice(summary: &Summary, best: Option<&DailyRecord>) -> String {
    let mut out = format!("Total revenue: {}", format_usd(summary.total_revenue));
    if let Some(best) = best {
        out.push_str(&format!(
            " | best day: {} ({})",
            best.date,
            format_usd(best.revenue)
        ));
    }
    out
}

/// `$1,234.567` (comma thousands, 3 decimals).
pub fn format_usd(value: f64) -> String {
    format_money(value, 3)
}

/// `$0.81` (comma thousands, 2 decimals).
pub fn format_cpm(value: f64) -> String {
    format_money(value, 2)
}

/// `1.000.000` (dot thousands).
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string(), '.')
}

fn format_money(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), ""));
    let sign = if value < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}${}", group_thousands(int_part, ','))
    } else {
        format!("{sign}${}.{frac_part}", group_thousands(int_part, ','))
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

fn format_day(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

fn format_range(range: DateRange) -> String {
    format!("{} - {}", format_day(range.start), format_day(range.end))
}

fn section_header(title: &str, palette: &Palette) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{rule}\n{}\n{rule}\n", palette.paint(title, Tone::Heading))
}

/// Render a table; the first column is left-aligned, the rest right-aligned.
fn render_table(headers: &[&str], rows: &[Vec<Cell>], palette: &Palette) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.text.chars().count());
            }
        }
    }

    let mut out = String::new();

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i], i == 0))
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');

    let rule_line: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule_line.join("  "));
    out.push('\n');

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                palette.paint(&pad(&cell.text, width, i == 0), cell.tone)
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}

fn format_pairs(pairs: &[(&str, Cell)], palette: &Palette) -> String {
    let label_width = pairs.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, cell) in pairs {
        out.push_str(&format!(
            "{}  {}\n",
            pad(label, label_width, true),
            palette.paint(&cell.text, cell.tone)
        ));
    }
    out
}

fn pad(text: &str, width: usize, left: bool) -> String {
    if left {
        format!("{text:<width$}")
    } else {
        format!("{text:>width$}")
    }
}
