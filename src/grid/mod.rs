//! The fixed 96-slot day. A slot is a quarter hour; slot 0 begins at the configured
//! day-start hour and the day runs until the same hour on the next calendar date.

pub mod calendar;

use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const SLOTS_PER_DAY: usize = 96;
pub const SLOT_MINUTES: u32 = 15;
pub const MINUTES_PER_DAY: u32 = 24 * 60;
pub const DEFAULT_DAY_START_HOUR: u32 = 8;

/// Converts between slot indices and wall clock times for a given day-start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClock {
    day_start_hour: u32,
}

impl Default for SlotClock {
    fn default() -> Self {
        Self {
            day_start_hour: DEFAULT_DAY_START_HOUR,
        }
    }
}

impl SlotClock {
    /// Hours outside of 0..24 wrap around the clock.
    pub fn new(day_start_hour: u32) -> Self {
        Self {
            day_start_hour: day_start_hour % 24,
        }
    }

    pub fn day_start_hour(&self) -> u32 {
        self.day_start_hour
    }

    /// Minutes after midnight at which the slot begins.
    pub fn slot_minutes(&self, index: usize) -> u32 {
        let index = (index % SLOTS_PER_DAY) as u32;
        (self.day_start_hour * 60 + index * SLOT_MINUTES) % MINUTES_PER_DAY
    }

    pub fn slot_start(&self, index: usize) -> NaiveTime {
        let minutes = self.slot_minutes(index);
        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Formats the start of a slot as `HH:MM`.
    pub fn slot_to_time(&self, index: usize) -> String {
        let minutes = self.slot_minutes(index);
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }

    /// Returns the slot containing `time`. Quarter-hour boundaries map back to the slot that
    /// starts there, so this is the inverse of [SlotClock::slot_to_time].
    pub fn time_to_slot(&self, time: NaiveTime) -> usize {
        let minutes = time.hour() * 60 + time.minute();
        let since_start = (minutes + MINUTES_PER_DAY - self.day_start_hour * 60) % MINUTES_PER_DAY;
        (since_start / SLOT_MINUTES) as usize
    }

    /// Same as [SlotClock::time_to_slot] but for `HH:MM` strings.
    pub fn parse_slot(&self, value: &str) -> Result<usize> {
        Ok(self.time_to_slot(parse_clock(value)?))
    }
}

/// Parses `HH:MM` into a time of day. `24:00` is accepted as midnight.
pub fn parse_clock(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    if value == "24:00" {
        return Ok(NaiveTime::MIN);
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| anyhow!("Can't parse {value} as HH:MM time: {e}"))
}

/// Inclusive, contiguous range of slots. Always ordered and within the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    first: usize,
    last: usize,
}

impl Selection {
    /// Builds the inclusive range between two slots in either order, clamped to the day.
    pub fn between(a: usize, b: usize) -> Self {
        let a = a.min(SLOTS_PER_DAY - 1);
        let b = b.min(SLOTS_PER_DAY - 1);
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    pub fn single(slot: usize) -> Self {
        Self::between(slot, slot)
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, slot: usize) -> bool {
        (self.first..=self.last).contains(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.first..=self.last
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}
