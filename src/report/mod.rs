//! Reporting: assemble classified buckets into a report, then format it.

use chrono::NaiveDate;

use crate::aggregate::{
    HalfMonthCycle, PeriodBucket, Summary, best_day, classify, fetch_window, summarize,
    summarize_records,
};
use crate::domain::{BucketName, DailyRecord, DateRange, Policy};

pub mod format;
pub mod style;

pub use format::*;
pub use style::*;

/// One classified bucket with its statistics.
#[derive(Debug, Clone)]
pub struct BucketReport {
    pub name: BucketName,
    pub bucket: PeriodBucket,
    pub summary: Summary,
}

/// Everything the presentation and export stages need from one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub policy: Policy,
    pub reference_date: NaiveDate,
    /// The date range requested from the endpoint.
    pub window: DateRange,
    /// Set for the half-month policy only.
    pub cycle: Option<HalfMonthCycle>,
    /// Buckets in report order.
    pub buckets: Vec<BucketReport>,
    /// Statistics across every classified record.
    pub overall: Summary,
    pub best_day: Option<DailyRecord>,
}

impl Report {
    pub fn build(records: &[DailyRecord], policy: Policy, reference_date: NaiveDate) -> Self {
        let window = fetch_window(&policy, reference_date);
        let cycle = match policy {
            Policy::HalfMonthSplit => Some(HalfMonthCycle::new(reference_date)),
            _ => None,
        };

        let buckets: Vec<BucketReport> = classify(records, &policy, reference_date)
            .into_iter()
            .map(|(name, bucket)| {
                let summary = summarize(&bucket);
                BucketReport {
                    name,
                    bucket,
                    summary,
                }
            })
            .collect();

        let classified = collect_records(&buckets);
        let overall = summarize_records(window, &classified);
        let best_day = best_day(&classified);

        Self {
            policy,
            reference_date,
            window,
            cycle,
            buckets,
            overall,
            best_day,
        }
    }

    pub fn bucket(&self, name: BucketName) -> Option<&BucketReport> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// Every classified record, ascending by date.
    pub fn records(&self) -> Vec<DailyRecord> {
        collect_records(&self.buckets)
    }

    /// True when no record landed in any bucket ("no data for this range").
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.bucket.is_empty())
    }
}

fn collect_records(buckets: &[BucketReport]) -> Vec<DailyRecord> {
    let mut out: Vec<DailyRecord> = buckets
        .iter()
        .flat_map(|b| b.bucket.records.iter().cloned())
        .collect();
    out.sort_by_key(|r| r.date);
    out
}
