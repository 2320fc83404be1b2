//! Turns raw pointer motion over the slot grid into a contiguous selection, telling apart a
//! horizontal drag-select from a vertical scroll.
//!
//! The logic lives in [transition], a pure function from `(state, input)` to
//! `(state, effect)`. [GestureRecognizer] keeps the state and the last selection between
//! inputs.

pub mod layout;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::grid::Selection;

pub use layout::GridLayout;

pub const DEFAULT_MIN_TRAVEL: f32 = 6.;
pub const DEFAULT_AXIS_LOCK_RATIO: f32 = 1.2;

pub type PointerId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Distance in pixels the pointer has to travel along an axis before the gesture is
    /// classified.
    pub min_travel: f32,
    /// How many times the travel along the winning axis has to exceed the other one.
    pub axis_lock_ratio: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_travel: DEFAULT_MIN_TRAVEL,
            axis_lock_ratio: DEFAULT_AXIS_LOCK_RATIO,
        }
    }
}

/// Raw pointer samples as delivered by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerInput {
    Press { pointer: PointerId, x: f32, y: f32 },
    Move { pointer: PointerId, x: f32, y: f32 },
    Release { pointer: PointerId },
    Cancel { pointer: PointerId },
}

impl PointerInput {
    pub fn pointer(&self) -> PointerId {
        match *self {
            PointerInput::Press { pointer, .. }
            | PointerInput::Move { pointer, .. }
            | PointerInput::Release { pointer }
            | PointerInput::Cancel { pointer } => pointer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pressed, direction not decided yet.
    Pending {
        pointer: PointerId,
        anchor: usize,
        origin: (f32, f32),
    },
    /// Locked to horizontal selection; the grid owns the pointer.
    HorizontalDrag { pointer: PointerId, anchor: usize },
    /// Vertical motion won; the scroll surface owns the rest of the interaction.
    ScrollCancelled { pointer: PointerId },
}

impl GestureState {
    pub fn pointer(&self) -> Option<PointerId> {
        match *self {
            GestureState::Idle => None,
            GestureState::Pending { pointer, .. }
            | GestureState::HorizontalDrag { pointer, .. }
            | GestureState::ScrollCancelled { pointer } => Some(pointer),
        }
    }
}

/// What the host has to do after an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// Nothing changes. Foreign pointers, presses outside the grid and motion after a scroll
    /// took over all end up here.
    Ignored,
    /// Still undecided.
    Waiting,
    /// A new interaction started; the selection is the pressed slot.
    Select(Selection),
    /// Horizontal drag detected: capture the pointer exclusively and show the selection.
    Capture(Selection),
    /// Drag continued; the selection was recomputed.
    Extend(Selection),
    /// Let the enclosing scroll surface handle the gesture.
    YieldToScroll,
    /// Interaction over. The last selection stays with the caller.
    Finished,
}

impl GestureEffect {
    pub fn selection(&self) -> Option<Selection> {
        match *self {
            GestureEffect::Select(selection)
            | GestureEffect::Capture(selection)
            | GestureEffect::Extend(selection) => Some(selection),
            _ => None,
        }
    }
}

pub fn transition(
    state: GestureState,
    input: PointerInput,
    layout: &GridLayout,
    config: &GestureConfig,
) -> (GestureState, GestureEffect) {
    let active = state.pointer();
    if active.is_some_and(|pointer| pointer != input.pointer()) {
        return (state, GestureEffect::Ignored);
    }

    match (state, input) {
        (_, PointerInput::Press { pointer, x, y }) => match layout.hit_slot(x, y) {
            Some(slot) => (
                GestureState::Pending {
                    pointer,
                    anchor: slot,
                    origin: (x, y),
                },
                GestureEffect::Select(Selection::single(slot)),
            ),
            None => (state, GestureEffect::Ignored),
        },
        (
            GestureState::Pending {
                pointer,
                anchor,
                origin,
            },
            PointerInput::Move { x, y, .. },
        ) => {
            let dx = (x - origin.0).abs();
            let dy = (y - origin.1).abs();
            if dy >= config.min_travel && dy >= dx * config.axis_lock_ratio {
                (
                    GestureState::ScrollCancelled { pointer },
                    GestureEffect::YieldToScroll,
                )
            } else if dx >= config.min_travel && dx >= dy * config.axis_lock_ratio {
                let selection = Selection::between(anchor, layout.nearest_slot(x, y));
                (
                    GestureState::HorizontalDrag { pointer, anchor },
                    GestureEffect::Capture(selection),
                )
            } else {
                (state, GestureEffect::Waiting)
            }
        }
        (GestureState::HorizontalDrag { anchor, .. }, PointerInput::Move { x, y, .. }) => {
            let selection = Selection::between(anchor, layout.nearest_slot(x, y));
            (state, GestureEffect::Extend(selection))
        }
        (GestureState::Idle | GestureState::ScrollCancelled { .. }, PointerInput::Move { .. }) => {
            (state, GestureEffect::Ignored)
        }
        (GestureState::Idle, PointerInput::Release { .. } | PointerInput::Cancel { .. }) => {
            (state, GestureEffect::Ignored)
        }
        (_, PointerInput::Release { .. } | PointerInput::Cancel { .. }) => {
            (GestureState::Idle, GestureEffect::Finished)
        }
    }
}

/// Keeps the per-interaction state and the selection that outlives it.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    layout: GridLayout,
    config: GestureConfig,
    state: GestureState,
    selection: Option<Selection>,
}

impl GestureRecognizer {
    pub fn new(layout: GridLayout) -> Self {
        Self::with_config(layout, GestureConfig::default())
    }

    pub fn with_config(layout: GridLayout, config: GestureConfig) -> Self {
        Self {
            layout,
            config,
            state: GestureState::Idle,
            selection: None,
        }
    }

    pub fn handle(&mut self, input: PointerInput) -> GestureEffect {
        let (state, effect) = transition(self.state, input, &self.layout, &self.config);
        trace!("Gesture {:?} + {:?} -> {:?} {:?}", self.state, input, state, effect);
        self.state = state;
        if let Some(selection) = effect.selection() {
            self.selection = Some(selection);
        }
        effect
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Whether the grid currently holds exclusive pointer capture.
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, GestureState::HorizontalDrag { .. })
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}
