//! Run-length view of a day: consecutive slots holding the same event collapse into one
//! segment. The grid is drawn in fixed-size rows while runs can cross rows, so segments can
//! be clipped to a row window that remembers where the true run edges are.

use std::ops::Range;

use serde::Serialize;

use crate::{grid::SLOTS_PER_DAY, model::EventId};

/// Maximal run `[start, end)` of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub event_id: EventId,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Part of a [Segment] visible inside a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPiece {
    pub start: usize,
    pub end: usize,
    pub event_id: EventId,
    /// The left edge is where the run really starts. Labels are drawn only here.
    pub is_start_here: bool,
    /// The right edge is where the run really ends.
    pub is_end_here: bool,
}

/// Compresses every slot of a day.
pub fn compress(slots: &[Option<EventId>]) -> Vec<Segment> {
    compress_range(slots, 0..slots.len())
}

/// Compresses `slots[range]` in one left-to-right pass. Segment bounds stay in the
/// coordinates of the whole slice. The range is clamped to the slice.
pub fn compress_range(slots: &[Option<EventId>], range: Range<usize>) -> Vec<Segment> {
    let end = range.end.min(slots.len());
    let start = range.start.min(end);

    let mut segments: Vec<Segment> = Vec::new();
    let mut current: Option<Segment> = None;

    for (index, entry) in slots[start..end].iter().enumerate() {
        let index = start + index;
        if let (Some(run), Some(event)) = (current.as_mut(), entry) {
            if run.event_id == *event {
                run.end = index + 1;
                continue;
            }
        }
        segments.extend(current.take());
        current = entry.as_ref().map(|event| Segment {
            start: index,
            end: index + 1,
            event_id: event.clone(),
        });
    }
    segments.extend(current);
    segments
}

/// Intersects ordered segments with a window, dropping those that miss it.
pub fn clip(segments: &[Segment], window: Range<usize>) -> Vec<SegmentPiece> {
    segments
        .iter()
        .skip_while(|segment| segment.end <= window.start)
        .take_while(|segment| segment.start < window.end)
        .filter_map(|segment| {
            let start = segment.start.max(window.start);
            let end = segment.end.min(window.end);
            (start < end).then(|| SegmentPiece {
                start,
                end,
                event_id: segment.event_id.clone(),
                is_start_here: start == segment.start,
                is_end_here: end == segment.end,
            })
        })
        .collect()
}

/// Splits the day into rows of `row_len` slots and clips the segments to each of them.
pub fn rows(segments: &[Segment], row_len: usize) -> Vec<(Range<usize>, Vec<SegmentPiece>)> {
    let row_len = row_len.max(1);
    (0..SLOTS_PER_DAY)
        .step_by(row_len)
        .map(|row_start| {
            let window = row_start..(row_start + row_len).min(SLOTS_PER_DAY);
            let pieces = clip(segments, window.clone());
            (window, pieces)
        })
        .collect()
}
