use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::EventId;

pub const RECENT_EVENTS_CAPACITY: usize = 8;

/// Most recently applied events, newest first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<EventId>", into = "Vec<EventId>")]
pub struct RecentEvents {
    capacity: usize,
    items: VecDeque<EventId>,
}

impl Default for RecentEvents {
    fn default() -> Self {
        Self::with_capacity(RECENT_EVENTS_CAPACITY)
    }
}

impl RecentEvents {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Moves `event` to the front, dropping the oldest entry when over capacity.
    pub fn touch(&mut self, event: EventId) {
        self.items.retain(|existing| *existing != event);
        self.items.push_front(event);
        self.items.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventId> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<EventId>> for RecentEvents {
    fn from(value: Vec<EventId>) -> Self {
        let mut recent = RecentEvents::default();
        // oldest first so the stored order survives the front inserts
        for event in value.into_iter().rev() {
            recent.touch(event);
        }
        recent
    }
}

impl From<RecentEvents> for Vec<EventId> {
    fn from(value: RecentEvents) -> Self {
        value.items.into()
    }
}
