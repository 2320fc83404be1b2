//! Aggregates over calendar windows. Every call rescans the day logs it is given; nothing is
//! cached between calls.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    grid::calendar::{month_keys, range_keys, trailing_keys, week_keys},
    model::{Catalog, DayLog},
};

use super::aggregation::{aggregate, Aggregate};

/// Length of the daily trend series in an [Overview].
pub const TREND_DAYS: usize = 7;

/// Day logs loaded for a computation. Dates without an entry count as missing.
pub type DaySnapshot = BTreeMap<NaiveDate, DayLog>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub anchor: NaiveDate,
    pub day: Aggregate,
    pub week: Aggregate,
    pub month: Aggregate,
    /// The anchor day and the six days before it, oldest first.
    pub trend: Vec<DailyTotal>,
}

fn aggregate_keys(keys: &[NaiveDate], snapshot: &DaySnapshot, catalog: &Catalog) -> Aggregate {
    aggregate(keys.iter().map(|key| snapshot.get(key)), catalog)
}

pub fn day(anchor: NaiveDate, snapshot: &DaySnapshot, catalog: &Catalog) -> Aggregate {
    aggregate_keys(&[anchor], snapshot, catalog)
}

/// Monday-to-Sunday week containing `anchor`.
pub fn week(anchor: NaiveDate, snapshot: &DaySnapshot, catalog: &Catalog) -> Aggregate {
    aggregate_keys(&week_keys(anchor), snapshot, catalog)
}

/// Calendar month containing `anchor`.
pub fn month(anchor: NaiveDate, snapshot: &DaySnapshot, catalog: &Catalog) -> Aggregate {
    aggregate_keys(&month_keys(anchor), snapshot, catalog)
}

/// Inclusive range of dates.
pub fn range(
    start: NaiveDate,
    end: NaiveDate,
    snapshot: &DaySnapshot,
    catalog: &Catalog,
) -> Aggregate {
    aggregate_keys(&range_keys(start, end), snapshot, catalog)
}

pub fn overview(anchor: NaiveDate, snapshot: &DaySnapshot, catalog: &Catalog) -> Overview {
    let trend = trailing_keys(anchor, TREND_DAYS)
        .into_iter()
        .map(|date| DailyTotal {
            date,
            total_minutes: day(date, snapshot, catalog).total_minutes,
        })
        .collect();

    Overview {
        anchor,
        day: day(anchor, snapshot, catalog),
        week: week(anchor, snapshot, catalog),
        month: month(anchor, snapshot, catalog),
        trend,
    }
}

/// Every date [overview] reads, sorted and without duplicates.
pub fn overview_keys(anchor: NaiveDate) -> Vec<NaiveDate> {
    let mut keys = month_keys(anchor);
    keys.extend(week_keys(anchor));
    keys.extend(trailing_keys(anchor, TREND_DAYS));
    keys.sort();
    keys.dedup();
    keys
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        grid::{calendar::add_days, Selection},
        model::{Catalog, DayLog},
    };

    use super::{month, overview, overview_keys, range, week, DaySnapshot};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.add_category("Work").unwrap();
        catalog.add_event("work", None, false).unwrap();
        catalog
    }

    /// Every day from 2025-01-25 to 2025-02-09 with one hour of work.
    fn snapshot() -> DaySnapshot {
        let mut snapshot = DaySnapshot::new();
        let mut current = date(2025, 1, 25);
        while current <= date(2025, 2, 9) {
            let mut day = DayLog::fresh(current);
            day.fill(&Selection::between(0, 3), Some(&"work".into()));
            snapshot.insert(current, day);
            current = add_days(current, 1);
        }
        snapshot
    }

    #[test]
    fn test_week_crosses_month_boundary() {
        // 2025-02-02 is a Sunday, its week starts on 2025-01-27
        let result = week(date(2025, 2, 2), &snapshot(), &catalog());
        assert_eq!(result.total_minutes, 7 * 60);
    }

    #[test]
    fn test_month_only_counts_its_days() {
        let result = month(date(2025, 2, 14), &snapshot(), &catalog());
        assert_eq!(result.total_minutes, 9 * 60);
        let result = month(date(2025, 1, 1), &snapshot(), &catalog());
        assert_eq!(result.total_minutes, 7 * 60);
    }

    #[test]
    fn test_range_is_inclusive() {
        let result = range(date(2025, 2, 8), date(2025, 2, 12), &snapshot(), &catalog());
        assert_eq!(result.total_minutes, 2 * 60);
    }

    #[test]
    fn test_overview_composes_windows() {
        let snapshot = snapshot();
        let overview = overview(date(2025, 2, 1), &snapshot, &catalog());
        assert_eq!(overview.day.total_minutes, 60);
        assert_eq!(overview.week.total_minutes, 7 * 60);
        assert_eq!(overview.month.total_minutes, 9 * 60);
        assert_eq!(overview.trend.len(), 7);
        assert_eq!(overview.trend[0].date, date(2025, 1, 26));
        assert_eq!(overview.trend[6].date, date(2025, 2, 1));
        assert!(overview.trend.iter().all(|v| v.total_minutes == 60));
    }

    #[test]
    fn test_overview_keys_cover_every_window() {
        let keys = overview_keys(date(2025, 3, 2));
        // February tail from the trailing series, March, and no duplicates
        assert_eq!(keys.first(), Some(&date(2025, 2, 24)));
        assert_eq!(keys.last(), Some(&date(2025, 3, 31)));
        assert_eq!(keys.len(), 31 + 5);
    }
}
