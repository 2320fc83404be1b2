use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    grid::SLOT_MINUTES,
    model::{Catalog, CategoryId, DayLog, EventId},
};

/// Minutes spent per category and per event over one or more days. Maps keep the order in
/// which keys were first met, which is what [top_n] falls back to on ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub total_minutes: u32,
    pub minutes_by_category_id: IndexMap<CategoryId, u32>,
    pub minutes_by_event_id: IndexMap<EventId, u32>,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.total_minutes == 0
    }
}

/// Scans every slot of every day once. Missing days are skipped.
pub fn aggregate<'a>(
    days: impl IntoIterator<Item = Option<&'a DayLog>>,
    catalog: &Catalog,
) -> Aggregate {
    let mut result = Aggregate::default();

    for day in days.into_iter().flatten() {
        for event in day.slots().iter().flatten() {
            result.total_minutes += SLOT_MINUTES;
            *result
                .minutes_by_event_id
                .entry(event.clone())
                .or_default() += SLOT_MINUTES;
            *result
                .minutes_by_category_id
                .entry(catalog.resolve_category(event))
                .or_default() += SLOT_MINUTES;
        }
    }

    result
}

/// Entries sorted by minutes, largest first. Equal minutes keep their map order.
pub fn top_n<K: Clone + Hash + Eq>(map: &IndexMap<K, u32>, n: usize) -> Vec<(K, u32)> {
    let mut entries = map
        .iter()
        .map(|(key, minutes)| (key.clone(), *minutes))
        .collect::<Vec<_>>();
    // sort_by is stable
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use proptest::prelude::*;

    use crate::{
        grid::{Selection, SLOTS_PER_DAY},
        model::{catalog::DELETED_CATEGORY_ID, Catalog, DayLog, EventId},
    };

    use super::{aggregate, top_n};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.add_category("Rest").unwrap();
        catalog.add_category("Work").unwrap();
        catalog.add_event("rest", Some("Sleep"), true).unwrap();
        catalog.add_event("work", None, false).unwrap();
        catalog
    }

    #[test]
    fn test_single_day_totals() {
        let mut day = DayLog::fresh(TEST_DATE);
        day.fill(&Selection::between(0, 3), Some(&"evtSleep".into()));
        day.set(8, Some("evtWork".into()));

        let result = aggregate([Some(&day)], &Catalog::default());
        assert_eq!(result.total_minutes, 75);
        assert_eq!(result.minutes_by_event_id.get("evtSleep"), Some(&60));
        assert_eq!(result.minutes_by_event_id.get("evtWork"), Some(&15));
        assert_eq!(result.minutes_by_event_id.len(), 2);
        // neither event is in the catalog
        assert_eq!(result.minutes_by_category_id.get(DELETED_CATEGORY_ID), Some(&75));
    }

    #[test]
    fn test_missing_days_are_skipped() {
        let catalog = catalog();
        let mut day = DayLog::fresh(TEST_DATE);
        day.fill(&Selection::between(10, 13), Some(&"work".into()));

        let with_gaps = aggregate([None, Some(&day), None], &catalog);
        let alone = aggregate([Some(&day)], &catalog);
        assert_eq!(with_gaps, alone);
        assert_eq!(alone.minutes_by_category_id.get("work"), Some(&60));

        let nothing = aggregate([None, None], &catalog);
        assert!(nothing.is_empty());
    }

    #[test]
    fn test_multiple_days_accumulate() {
        let catalog = catalog();
        let mut first = DayLog::fresh(TEST_DATE);
        first.fill(&Selection::between(60, 91), Some(&"rest-sleep".into()));
        let mut second = DayLog::fresh(TEST_DATE.succ_opt().unwrap());
        second.fill(&Selection::between(64, 91), Some(&"rest-sleep".into()));
        second.fill(&Selection::between(0, 3), Some(&"work".into()));

        let result = aggregate([Some(&first), Some(&second)], &catalog);
        assert_eq!(result.minutes_by_event_id.get("rest-sleep"), Some(&(60 * 15)));
        assert_eq!(result.minutes_by_category_id.get("rest"), Some(&(60 * 15)));
        assert_eq!(result.minutes_by_category_id.get("work"), Some(&60));
        assert_eq!(result.total_minutes, 64 * 15);
    }

    #[test]
    fn test_top_n_breaks_ties_by_first_encounter() {
        let mut map = IndexMap::<EventId, u32>::new();
        map.insert("b".into(), 30);
        map.insert("a".into(), 60);
        map.insert("c".into(), 30);
        map.insert("d".into(), 15);

        let ranked = top_n(&map, 3);
        let keys = ranked.iter().map(|v| v.0.to_string()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(top_n(&map, 10).len(), 4);
        assert!(top_n(&map, 0).is_empty());
    }

    fn arbitrary_days() -> impl Strategy<Value = Vec<Option<DayLog>>> {
        let day = prop::collection::vec(
            prop::option::of(prop::sample::select(vec!["rest-sleep", "work", "gone"])),
            SLOTS_PER_DAY,
        )
        .prop_map(|slots| {
            let mut day = DayLog::fresh(TEST_DATE);
            for (slot, event) in slots.into_iter().enumerate() {
                day.set(slot, event.map(EventId::from));
            }
            day
        });
        prop::collection::vec(prop::option::of(day), 1..6)
    }

    proptest! {
        #[test]
        fn aggregation_conserves_minutes(days in arbitrary_days()) {
            let result = aggregate(days.iter().map(Option::as_ref), &catalog());
            let by_event: u32 = result.minutes_by_event_id.values().sum();
            let by_category: u32 = result.minutes_by_category_id.values().sum();
            prop_assert_eq!(by_event, result.total_minutes);
            prop_assert_eq!(by_category, result.total_minutes);
        }

        #[test]
        fn top_n_is_deterministic(days in arbitrary_days(), n in 0usize..5) {
            let result = aggregate(days.iter().map(Option::as_ref), &catalog());
            prop_assert_eq!(
                top_n(&result.minutes_by_event_id, n),
                top_n(&result.minutes_by_event_id, n)
            );
        }
    }
}
