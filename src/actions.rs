//! Edits driven by the user: writing an event into a selection, deleting events, and the
//! bulk fills (night range, fixed events from the previous day).

use chrono::{NaiveTime, Timelike};
use tracing::debug;

use crate::{
    grid::{Selection, SLOTS_PER_DAY},
    model::{Catalog, DayLog, EventId, EventTag, RecentEvents, Settings},
};

/// Writes `event` into every selected slot and moves it to the front of the recent list.
pub fn apply_event(
    day: &mut DayLog,
    selection: &Selection,
    event: &EventId,
    recent: &mut RecentEvents,
) {
    debug!("Applying {event} to {selection} on {}", day.date());
    day.fill(selection, Some(event));
    recent.touch(event.clone());
}

pub fn clear_slots(day: &mut DayLog, selection: &Selection) {
    debug!("Clearing {selection} on {}", day.date());
    day.fill(selection, None);
}

/// Removes an event from the catalog and empties its slots in `day`. Other days keep their
/// references and resolve them as deleted.
pub fn delete_event(
    catalog: &mut Catalog,
    day: &mut DayLog,
    event_id: &str,
) -> Option<(EventTag, usize)> {
    let removed = catalog.delete_event(event_id)?;
    let cleared = day.clear_event(event_id);
    debug!("Deleted event {event_id}, cleared {cleared} slots");
    Some((removed, cleared))
}

/// Whether `time` falls in `[start, end)`, wrapping past midnight when `end <= start`.
fn in_clock_window(time: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        start <= time && time < end
    } else {
        time >= start || time < end
    }
}

/// Sets every empty slot starting inside the night window to `event`. Returns the number of
/// slots written.
pub fn fill_night(day: &mut DayLog, settings: &Settings, event: &EventId) -> usize {
    let clock = settings.slot_clock();
    let mut filled = 0;
    for slot in 0..SLOTS_PER_DAY {
        let start = clock.slot_start(slot);
        if day.get(slot).is_none()
            && in_clock_window(start, settings.night_start, settings.night_end)
        {
            day.set(slot, Some(event.clone()));
            filled += 1;
        }
    }
    debug!(
        "Filled {filled} night slots between {:02}:{:02} and {:02}:{:02}",
        settings.night_start.hour(),
        settings.night_start.minute(),
        settings.night_end.hour(),
        settings.night_end.minute()
    );
    filled
}

/// Copies fixed events of `previous` into the same, still empty, slots of `day`.
pub fn copy_fixed_from(previous: &DayLog, day: &mut DayLog, catalog: &Catalog) -> usize {
    let mut copied = 0;
    for (slot, entry) in previous.slots().iter().enumerate() {
        let Some(event) = entry else {
            continue;
        };
        let fixed = catalog.event(event).is_some_and(|v| v.fixed);
        if fixed && day.get(slot).is_none() {
            day.set(slot, Some(event.clone()));
            copied += 1;
        }
    }
    debug!(
        "Copied {copied} fixed slots from {} to {}",
        previous.date(),
        day.date()
    );
    copied
}
