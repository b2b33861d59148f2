//! Calendar arithmetic: half-month cycles and per-policy fetch windows.
//!
//! Helpers here saturate at chrono's calendar limits instead of failing, so
//! classification stays a total function of its inputs.

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::{DateRange, Policy};

/// Day of month on which the first half ends.
pub const HALF_MONTH_SPLIT_DAY: u32 = 15;

/// The 1st–15th / 16th–end-of-month split around a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfMonthCycle {
    /// The half before the one containing `today`.
    pub previous: DateRange,
    /// The full calendar half containing `today`.
    pub current: DateRange,
    pub today: NaiveDate,
}

impl HalfMonthCycle {
    pub fn new(today: NaiveDate) -> Self {
        let first = month_start(today);
        if today.day() <= HALF_MONTH_SPLIT_DAY {
            let prev_end = first.pred_opt().unwrap_or(first);
            Self {
                previous: DateRange::new(day_of_month(prev_end, HALF_MONTH_SPLIT_DAY + 1), prev_end),
                current: DateRange::new(first, day_of_month(today, HALF_MONTH_SPLIT_DAY)),
                today,
            }
        } else {
            Self {
                previous: DateRange::new(first, day_of_month(today, HALF_MONTH_SPLIT_DAY)),
                current: DateRange::new(day_of_month(today, HALF_MONTH_SPLIT_DAY + 1), month_end(today)),
                today,
            }
        }
    }

    /// Finalized part of the current half: its start through yesterday.
    ///
    /// Empty when today is the first day of the half.
    pub fn current_through_yesterday(&self) -> DateRange {
        let yesterday = self.today.pred_opt().unwrap_or(self.today);
        DateRange::new(self.current.start, yesterday.min(self.current.end))
    }

    /// The live (non-final) single-day range.
    pub fn today_range(&self) -> DateRange {
        DateRange::new(self.today, self.today)
    }
}

/// Date range to request from the stats endpoint for a policy.
pub fn fetch_window(policy: &Policy, reference_date: NaiveDate) -> DateRange {
    match policy {
        Policy::AllTime { since } => DateRange::new(*since, reference_date),
        Policy::RollingWindow { days } | Policy::MonthlyGrouped { days } => {
            DateRange::new(days_before(reference_date, *days), reference_date)
        }
        Policy::HalfMonthSplit => {
            DateRange::new(HalfMonthCycle::new(reference_date).previous.start, reference_date)
        }
    }
}

pub fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(chrono::Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn day_of_month(date: NaiveDate, day: u32) -> NaiveDate {
    date.with_day(day).unwrap_or(date)
}
