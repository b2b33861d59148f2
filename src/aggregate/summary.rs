//! Per-bucket statistics, best-day lookup, and rounding rules.

use crate::aggregate::classify::PeriodBucket;
use crate::domain::{DailyRecord, DateRange};

/// Decimal places kept for monetary values.
pub const MONEY_DECIMALS: i32 = 3;
/// Decimal places kept for CPM values.
pub const CPM_DECIMALS: i32 = 2;

/// Summary statistics over one bucket.
///
/// Money fields are rounded to 3 decimals and CPM fields to 2.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub range: DateRange,
    pub total_impressions: u64,
    pub total_revenue: f64,
    /// Days with a record, not the calendar span.
    pub active_days: usize,
    pub average_daily_revenue: f64,
    /// Traffic-weighted: `total_revenue / total_impressions * 1000`.
    pub effective_cpm: f64,
    /// Unweighted mean of the per-day reported CPM.
    pub average_reported_cpm: f64,
}

impl Summary {
    /// Integer average of impressions per active day (truncated).
    pub fn average_daily_impressions(&self) -> u64 {
        if self.active_days == 0 {
            return 0;
        }
        self.total_impressions / self.active_days as u64
    }
}

pub fn summarize(bucket: &PeriodBucket) -> Summary {
    summarize_records(bucket.range, &bucket.records)
}

/// Summarize an arbitrary record slice labelled with `range`.
pub fn summarize_records(range: DateRange, records: &[DailyRecord]) -> Summary {
    let total_impressions: u64 = records.iter().map(|r| r.impressions).sum();
    let total_revenue: f64 = records.iter().map(|r| r.revenue).sum();
    let cpm_sum: f64 = records.iter().map(|r| r.cpm).sum();
    let active_days = records.len();

    let (average_daily_revenue, average_reported_cpm) = if active_days == 0 {
        (0.0, 0.0)
    } else {
        let n = active_days as f64;
        (total_revenue / n, cpm_sum / n)
    };

    Summary {
        range,
        total_impressions,
        total_revenue: round_money(total_revenue),
        active_days,
        average_daily_revenue: round_money(average_daily_revenue),
        effective_cpm: round_cpm(effective_cpm(total_revenue, total_impressions)),
        average_reported_cpm: round_cpm(average_reported_cpm),
    }
}

/// Revenue per thousand impressions; `0` when there were no impressions.
pub fn effective_cpm(revenue: f64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    revenue / impressions as f64 * 1000.0
}

/// The record with the highest revenue; ties go to the earliest date.
pub fn best_day(records: &[DailyRecord]) -> Option<DailyRecord> {
    let mut sorted: Vec<&DailyRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut best: Option<&DailyRecord> = None;
    for record in sorted {
        match best {
            Some(current) if record.revenue <= current.revenue => {}
            _ => best = Some(record),
        }
    }
    best.cloned()
}

pub fn round_money(value: f64) -> f64 {
    round_to(value, MONEY_DECIMALS)
}

pub fn round_cpm(value: f64) -> f64 {
    round_to(value, CPM_DECIMALS)
}

/// Round half away from zero at `decimals` places.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(date: NaiveDate, impressions: u64, cpm: f64, revenue: f64) -> DailyRecord {
        DailyRecord {
            date,
            impressions,
            cpm,
            revenue,
        }
    }

    fn range() -> DateRange {
        DateRange::new(day(2026, 2, 1), day(2026, 2, 28))
    }

    #[test]
    fn empty_bucket_is_all_zeros() {
        let s = summarize(&PeriodBucket::new(range()));
        assert_eq!(s.active_days, 0);
        assert_eq!(s.total_impressions, 0);
        assert_eq!(s.total_revenue, 0.0);
        assert_eq!(s.average_daily_revenue, 0.0);
        assert_eq!(s.effective_cpm, 0.0);
        assert_eq!(s.average_reported_cpm, 0.0);
        assert_eq!(s.average_daily_impressions(), 0);
    }

    #[test]
    fn zero_impressions_give_zero_effective_cpm() {
        let records = vec![rec(day(2026, 2, 1), 0, 0.0, 1.5)];
        let s = summarize_records(range(), &records);
        assert_eq!(s.effective_cpm, 0.0);
        assert!(s.effective_cpm.is_finite());
        assert_eq!(s.total_revenue, 1.5);
    }

    #[test]
    fn totals_and_averages() {
        let records = vec![
            rec(day(2026, 2, 16), 20_000, 0.9, 18.0),
            rec(day(2026, 2, 19), 10_000, 0.6, 6.0),
        ];
        let s = summarize_records(range(), &records);
        assert_eq!(s.total_impressions, 30_000);
        assert_eq!(s.total_revenue, 24.0);
        assert_eq!(s.active_days, 2);
        assert_eq!(s.average_daily_revenue, 12.0);
        assert_eq!(s.effective_cpm, 0.8);
        assert_eq!(s.average_reported_cpm, 0.75);
        assert_eq!(s.average_daily_impressions(), 15_000);
    }

    #[test]
    fn effective_and_reported_cpm_differ_when_traffic_is_uneven() {
        let records = vec![
            rec(day(2026, 2, 1), 100_000, 1.0, 100.0),
            rec(day(2026, 2, 2), 1_000, 3.0, 3.0),
        ];
        let s = summarize_records(range(), &records);
        assert_eq!(s.effective_cpm, 1.02);
        assert_eq!(s.average_reported_cpm, 2.0);
    }

    #[test]
    fn total_revenue_matches_record_sum() {
        let records: Vec<DailyRecord> = (1..=28)
            .map(|d| rec(day(2026, 2, d), 1000 + d as u64, 0.41, 0.123_456 * d as f64))
            .collect();
        let s = summarize_records(range(), &records);
        let sum: f64 = records.iter().map(|r| r.revenue).sum();
        assert!((s.total_revenue - sum).abs() <= 0.001);
        assert_eq!(s.active_days, 28);
    }

    #[test]
    fn rounding_rules() {
        assert_eq!(round_money(12.34567), 12.346);
        assert_eq!(round_cpm(0.8055), 0.81);
        assert_eq!(round_cpm(0.804), 0.8);
        assert_eq!(round_money(0.0), 0.0);
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        assert_eq!(round_cpm(0.125), 0.13);
        assert_eq!(round_cpm(-0.125), -0.13);
        assert_eq!(round_cpm(0.375), 0.38);
        assert_eq!(round_money(2.0625), 2.063);
        assert_eq!(round_money(-2.0625), -2.063);
    }

    #[test]
    fn best_day_prefers_earliest_on_ties() {
        let records = vec![
            rec(day(2026, 1, 2), 10, 0.1, 5.0),
            rec(day(2026, 1, 1), 10, 0.1, 5.0),
        ];
        assert_eq!(best_day(&records).unwrap().date, day(2026, 1, 1));
    }

    #[test]
    fn best_day_takes_strict_maximum() {
        let records = vec![
            rec(day(2026, 1, 1), 10, 0.1, 5.0),
            rec(day(2026, 1, 3), 10, 0.1, 7.5),
            rec(day(2026, 1, 2), 10, 0.1, 7.0),
        ];
        assert_eq!(best_day(&records).unwrap().date, day(2026, 1, 3));
    }

    #[test]
    fn best_day_of_nothing_is_none() {
        assert!(best_day(&[]).is_none());
    }

    #[test]
    fn best_day_with_all_zero_revenue_is_first_day() {
        let records = vec![rec(day(2026, 1, 5), 0, 0.0, 0.0), rec(day(2026, 1, 4), 0, 0.0, 0.0)];
        assert_eq!(best_day(&records).unwrap().date, day(2026, 1, 4));
    }
}
