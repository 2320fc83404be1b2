use serde::Serialize;

use crate::{
    model::{Catalog, CategoryId, EventId},
    palette::{color_for, ColorPair},
    utils::percentage::{minutes_percentage, Percentage},
};

use super::aggregation::{top_n, Aggregate};

/// Display row for one category or event of an [Aggregate].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRow {
    pub category_id: CategoryId,
    pub event_id: Option<EventId>,
    pub label: String,
    pub minutes: u32,
    pub share: Percentage,
    pub color: ColorPair,
}

pub fn category_rows(
    aggregate: &Aggregate,
    catalog: &Catalog,
    n: usize,
    dark: bool,
) -> Vec<RankedRow> {
    top_n(&aggregate.minutes_by_category_id, n)
        .into_iter()
        .map(|(category_id, minutes)| RankedRow {
            label: catalog.category_label(&category_id),
            share: minutes_percentage(minutes, aggregate.total_minutes),
            color: color_for(&category_id, None, dark),
            category_id,
            event_id: None,
            minutes,
        })
        .collect()
}

pub fn event_rows(
    aggregate: &Aggregate,
    catalog: &Catalog,
    n: usize,
    dark: bool,
) -> Vec<RankedRow> {
    top_n(&aggregate.minutes_by_event_id, n)
        .into_iter()
        .map(|(event_id, minutes)| {
            let category_id = catalog.resolve_category(&event_id);
            RankedRow {
                label: catalog.event_label(&event_id),
                share: minutes_percentage(minutes, aggregate.total_minutes),
                color: color_for(&category_id, Some(&*event_id), dark),
                category_id,
                event_id: Some(event_id),
                minutes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        analysis::aggregation::aggregate,
        grid::Selection,
        model::{catalog::DELETED_LABEL, Catalog, DayLog},
        palette::color_for,
    };

    use super::{category_rows, event_rows};

    #[test]
    fn test_rows_carry_labels_shares_and_colors() {
        let mut catalog = Catalog::default();
        catalog.add_category("Work").unwrap();
        catalog.add_event("work", Some("Email"), false).unwrap();
        catalog.add_event("work", Some("Code"), false).unwrap();

        let mut day = DayLog::fresh(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        day.fill(&Selection::between(0, 5), Some(&"work-code".into()));
        day.fill(&Selection::between(6, 7), Some(&"work-email".into()));
        day.fill(&Selection::between(8, 9), Some(&"removed".into()));

        let result = aggregate([Some(&day)], &catalog);

        let categories = category_rows(&result, &catalog, 5, false);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].label, "Work");
        assert_eq!(categories[0].minutes, 120);
        assert_eq!(*categories[0].share, 80.);
        assert_eq!(categories[1].label, DELETED_LABEL);

        let events = event_rows(&result, &catalog, 2, true);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "Code");
        assert_eq!(events[1].label, "Email");
        assert_eq!(events[1].minutes, 30);
        assert_eq!(events[0].color, color_for("work", Some("work-code"), true));
    }
}
