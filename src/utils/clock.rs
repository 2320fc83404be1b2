use chrono::{DateTime, Local, NaiveDate, Timelike};

use crate::grid::{calendar::add_days, SlotClock};

/// Represents an entity responsible for providing the current time across the application.
/// This allows it to be pinned in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Date whose grid contains the current instant. Before the day start hour the grid of the
/// previous calendar date is still running.
pub fn operational_day(clock: &impl Clock, slot_clock: &SlotClock) -> NaiveDate {
    let now = clock.now();
    let date = now.date_naive();
    if now.hour() < slot_clock.day_start_hour() {
        add_days(date, -1)
    } else {
        date
    }
}

/// Slot containing the current instant.
pub fn current_slot(clock: &impl Clock, slot_clock: &SlotClock) -> usize {
    slot_clock.time_to_slot(clock.now().time())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, NaiveDate};

    use crate::grid::SlotClock;

    use super::{current_slot, operational_day, MockClock};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap()
    }

    fn clock_at(now: DateTime<Local>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(now);
        clock
    }

    #[test]
    fn test_operational_day_before_and_after_start() {
        let slot_clock = SlotClock::default();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let clock = clock_at(at(2025, 3, 1, 7, 59));
        assert_eq!(
            operational_day(&clock, &slot_clock),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );

        let clock = clock_at(at(2025, 3, 1, 8, 0));
        assert_eq!(operational_day(&clock, &slot_clock), date);
        assert_eq!(current_slot(&clock, &slot_clock), 0);
    }

    #[test]
    fn test_midnight_start_follows_calendar() {
        let slot_clock = SlotClock::new(0);
        let clock = clock_at(at(2025, 1, 1, 0, 20));
        assert_eq!(
            operational_day(&clock, &slot_clock),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(current_slot(&clock, &slot_clock), 1);
    }

    #[test]
    fn test_current_slot_wraps_after_midnight() {
        let slot_clock = SlotClock::default();
        let clock = clock_at(at(2025, 1, 2, 1, 44));
        // 01:44 is 17h44m after 08:00, slot 70
        assert_eq!(current_slot(&clock, &slot_clock), 70);
    }
}
