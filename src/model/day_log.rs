use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Selection, SLOTS_PER_DAY, SLOT_MINUTES};

use super::EventId;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("day log must hold {SLOTS_PER_DAY} slots, found {found}")]
pub struct SlotCountError {
    pub found: usize,
}

/// Day log exactly as it appears on disk or in an import payload, before the slot count has
/// been checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDayLog {
    pub date_key: NaiveDate,
    pub slots: Vec<Option<EventId>>,
}

/// Assignment of events to the 96 slots of one day. The slot count is enforced on
/// construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDayLog")]
pub struct DayLog {
    date_key: NaiveDate,
    slots: Vec<Option<EventId>>,
}

impl TryFrom<RawDayLog> for DayLog {
    type Error = SlotCountError;

    fn try_from(RawDayLog { date_key, slots }: RawDayLog) -> Result<Self, Self::Error> {
        if slots.len() != SLOTS_PER_DAY {
            return Err(SlotCountError { found: slots.len() });
        }
        Ok(Self { date_key, slots })
    }
}

impl DayLog {
    /// All-empty log for a date.
    pub fn fresh(date_key: NaiveDate) -> Self {
        Self {
            date_key,
            slots: vec![None; SLOTS_PER_DAY],
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date_key
    }

    pub fn slots(&self) -> &[Option<EventId>] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&EventId> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Out of range slots are ignored.
    pub fn set(&mut self, slot: usize, event: Option<EventId>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = event;
        }
    }

    pub fn fill(&mut self, selection: &Selection, event: Option<&EventId>) {
        for slot in selection.iter() {
            self.set(slot, event.cloned());
        }
    }

    /// Empties every slot holding `event`, returning how many were cleared.
    pub fn clear_event(&mut self, event: &str) -> usize {
        let mut cleared = 0;
        for entry in self.slots.iter_mut() {
            if entry.as_deref() == Some(event) {
                *entry = None;
                cleared += 1;
            }
        }
        cleared
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|v| v.is_some()).count()
    }

    pub fn tracked_minutes(&self) -> u32 {
        self.filled_slots() as u32 * SLOT_MINUTES
    }

    pub fn is_empty(&self) -> bool {
        self.filled_slots() == 0
    }
}
