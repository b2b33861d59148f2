//! Partition daily records into named, date-bounded buckets.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::aggregate::periods::{HalfMonthCycle, days_before, month_end, month_start};
use crate::domain::{BucketName, DailyRecord, DateRange, Policy, YearMonth};

/// Classification output, iterated in report order.
pub type Buckets = BTreeMap<BucketName, PeriodBucket>;

/// Records falling inside an inclusive date range, sorted ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBucket {
    pub range: DateRange,
    pub records: Vec<DailyRecord>,
}

impl PeriodBucket {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Classify `records` under `policy`, anchored at `reference_date`.
///
/// Bucket ranges produced for one policy are disjoint. Records matching no
/// bucket are dropped. The result depends only on the set of records, not
/// their order.
pub fn classify(records: &[DailyRecord], policy: &Policy, reference_date: NaiveDate) -> Buckets {
    let mut buckets = match policy {
        Policy::AllTime { since } => {
            single(BucketName::Window, DateRange::new(*since, reference_date))
        }
        Policy::RollingWindow { days } => single(
            BucketName::Window,
            DateRange::new(days_before(reference_date, *days), reference_date),
        ),
        Policy::MonthlyGrouped { .. } => month_buckets(records),
        Policy::HalfMonthSplit => {
            let cycle = HalfMonthCycle::new(reference_date);
            Buckets::from([
                (BucketName::Previous, PeriodBucket::new(cycle.previous)),
                (BucketName::Current, PeriodBucket::new(cycle.current_through_yesterday())),
                (BucketName::Today, PeriodBucket::new(cycle.today_range())),
            ])
        }
    };

    for record in records {
        if let Some(bucket) = buckets.values_mut().find(|b| b.range.contains(record.date)) {
            bucket.records.push(record.clone());
        }
    }

    for bucket in buckets.values_mut() {
        bucket.records.sort_by_key(|r| r.date);
    }

    buckets
}

fn single(name: BucketName, range: DateRange) -> Buckets {
    Buckets::from([(name, PeriodBucket::new(range))])
}

/// One empty bucket per month that has at least one record.
fn month_buckets(records: &[DailyRecord]) -> Buckets {
    let mut buckets = Buckets::new();
    for record in records {
        buckets
            .entry(BucketName::Month(YearMonth::of(record.date)))
            .or_insert_with(|| {
                PeriodBucket::new(DateRange::new(month_start(record.date), month_end(record.date)))
            });
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(date: NaiveDate, revenue: f64) -> DailyRecord {
        DailyRecord {
            date,
            impressions: 1000,
            cpm: 0.5,
            revenue,
        }
    }

    fn dates(bucket: &PeriodBucket) -> Vec<NaiveDate> {
        bucket.records.iter().map(|r| r.date).collect()
    }

    fn scenario() -> Vec<DailyRecord> {
        vec![
            rec(day(2026, 2, 19), 30.0),
            rec(day(2026, 2, 5), 10.0),
            rec(day(2026, 2, 20), 40.0),
            rec(day(2026, 2, 16), 20.0),
        ]
    }

    #[test]
    fn half_month_split_scenario() {
        let buckets = classify(&scenario(), &Policy::HalfMonthSplit, day(2026, 2, 20));
        assert_eq!(buckets.len(), 3);

        let prev = &buckets[&BucketName::Previous];
        assert_eq!(dates(prev), vec![day(2026, 2, 5)]);

        let curr = &buckets[&BucketName::Current];
        assert_eq!(dates(curr), vec![day(2026, 2, 16), day(2026, 2, 19)]);

        let today = &buckets[&BucketName::Today];
        assert_eq!(dates(today), vec![day(2026, 2, 20)]);
        assert_eq!(today.records[0].revenue, 40.0);
    }

    #[test]
    fn half_month_split_always_has_three_buckets() {
        let buckets = classify(&[], &Policy::HalfMonthSplit, day(2026, 2, 1));
        assert_eq!(
            buckets.keys().copied().collect::<Vec<_>>(),
            vec![BucketName::Previous, BucketName::Current, BucketName::Today]
        );
        assert!(buckets.values().all(PeriodBucket::is_empty));
    }

    #[test]
    fn half_month_ranges_never_overlap() {
        let mut reference = day(2025, 12, 1);
        while reference < day(2026, 4, 1) {
            let buckets = classify(&[], &Policy::HalfMonthSplit, reference);
            let ranges: Vec<DateRange> = buckets.values().map(|b| b.range).collect();
            let mut d = ranges[0].start;
            while d <= reference {
                let hits = ranges.iter().filter(|r| r.contains(d)).count();
                assert!(hits <= 1, "{d} covered {hits} times for reference {reference}");
                d = d.succ_opt().unwrap();
            }
            reference = reference.succ_opt().unwrap();
        }
    }

    #[test]
    fn records_outside_every_bucket_are_dropped() {
        let records = vec![rec(day(2026, 1, 31), 5.0), rec(day(2026, 2, 21), 5.0)];
        let buckets = classify(&records, &Policy::HalfMonthSplit, day(2026, 2, 20));
        assert!(buckets.values().all(PeriodBucket::is_empty));
    }

    #[test]
    fn classification_ignores_input_order() {
        let policies = [
            Policy::HalfMonthSplit,
            Policy::MonthlyGrouped { days: 90 },
            Policy::RollingWindow { days: 7 },
            Policy::AllTime { since: day(2026, 1, 1) },
        ];
        let forward = scenario();
        let mut reversed = scenario();
        reversed.reverse();
        let mut rotated = scenario();
        rotated.rotate_left(2);

        for policy in &policies {
            let expected = classify(&forward, policy, day(2026, 2, 20));
            assert_eq!(classify(&reversed, policy, day(2026, 2, 20)), expected);
            assert_eq!(classify(&rotated, policy, day(2026, 2, 20)), expected);
        }
    }

    #[test]
    fn monthly_groups_by_year_month() {
        let records = vec![
            rec(day(2026, 2, 1), 3.0),
            rec(day(2026, 1, 30), 1.0),
            rec(day(2026, 1, 31), 2.0),
        ];
        let buckets = classify(&records, &Policy::MonthlyGrouped { days: 90 }, day(2026, 2, 2));
        assert_eq!(buckets.len(), 2);

        let jan = &buckets[&BucketName::Month(YearMonth { year: 2026, month: 1 })];
        assert_eq!(jan.records.len(), 2);
        assert_eq!(jan.range, DateRange::new(day(2026, 1, 1), day(2026, 1, 31)));

        let feb = &buckets[&BucketName::Month(YearMonth { year: 2026, month: 2 })];
        assert_eq!(feb.records.len(), 1);
    }

    #[test]
    fn monthly_skips_months_without_records() {
        let records = vec![rec(day(2025, 11, 3), 1.0), rec(day(2026, 1, 4), 1.0)];
        let buckets = classify(&records, &Policy::MonthlyGrouped { days: 90 }, day(2026, 1, 5));
        assert_eq!(buckets.len(), 2);
        assert!(!buckets.contains_key(&BucketName::Month(YearMonth { year: 2025, month: 12 })));
    }

    #[test]
    fn rolling_window_is_inclusive_on_both_ends() {
        let records = vec![
            rec(day(2026, 2, 12), 1.0),
            rec(day(2026, 2, 13), 2.0),
            rec(day(2026, 2, 20), 3.0),
        ];
        let buckets = classify(&records, &Policy::RollingWindow { days: 7 }, day(2026, 2, 20));
        let window = &buckets[&BucketName::Window];
        assert_eq!(dates(window), vec![day(2026, 2, 13), day(2026, 2, 20)]);
    }

    #[test]
    fn all_time_starts_at_configured_date() {
        let records = vec![rec(day(2022, 9, 30), 1.0), rec(day(2022, 10, 1), 2.0)];
        let policy = Policy::AllTime { since: day(2022, 10, 1) };
        let buckets = classify(&records, &policy, day(2026, 2, 20));
        assert_eq!(dates(&buckets[&BucketName::Window]), vec![day(2022, 10, 1)]);
    }
}
