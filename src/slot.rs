//! Slot struct for the persistent per-beam tracks maintained by the tracker.

use crate::Point;

/// What a slot holds in the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotState {
    /// No detection continues this slot.
    Empty,
    /// The slot's object is at the given position.
    Occupied(Point),
}

impl SlotState {
    /// The held position, if any.
    pub fn position(&self) -> Option<Point> {
        match *self {
            SlotState::Empty => None,
            SlotState::Occupied(point) => Some(point),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SlotState::Empty)
    }
}

impl From<Option<Point>> for SlotState {
    fn from(position: Option<Point>) -> Self {
        position.map_or(SlotState::Empty, SlotState::Occupied)
    }
}

/// A persistent logical track, one per beam.
///
/// Slots are created empty when the tracker is built and live as long as the
/// tracker. Only the tracker mutates them.
///
/// Invariants:
/// - `occupied` is only set while `state` is `Occupied`
/// - `reference` is set the first time the slot holds a position and is
///   never cleared afterwards; bulk initialization may move it once
#[derive(Debug, Clone)]
pub struct Slot {
    index: usize,
    state: SlotState,
    reference: Option<Point>,
    occupied: bool,
    last_trigger: Option<f64>,
}

impl Slot {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            state: SlotState::Empty,
            reference: None,
            occupied: false,
            last_trigger: None,
        }
    }

    /// Stable slot index (`0..max_objects`).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Position held this frame, if any.
    pub fn position(&self) -> Option<Point> {
        self.state.position()
    }

    /// First position assigned to this slot, or its bulk-initialization
    /// anchor.
    pub fn reference_position(&self) -> Option<Point> {
        self.reference
    }

    /// True between a trigger and the following release.
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Timestamp (seconds) of the most recent trigger.
    pub fn last_trigger_time(&self) -> Option<f64> {
        self.last_trigger
    }

    /// Whether this slot has ever held a position.
    pub fn has_history(&self) -> bool {
        self.reference.is_some()
    }

    /// Replace the current position. A newly held position becomes the
    /// reference if the slot never had one; an empty state drops the
    /// occupied flag so the invariant holds.
    pub(crate) fn set_state(&mut self, state: SlotState) {
        if let SlotState::Occupied(point) = state {
            if self.reference.is_none() {
                self.reference = Some(point);
            }
        } else {
            self.occupied = false;
        }
        self.state = state;
    }

    /// Pin both the position and the reference (bulk initialization).
    pub(crate) fn anchor(&mut self, point: Point) {
        self.reference = Some(point);
        self.state = SlotState::Occupied(point);
    }

    /// Whether a trigger may fire at `now`: the slot holds a position, is not
    /// already occupied, and more than `debounce` seconds have passed since
    /// the previous trigger. A slot that never fired is always eligible.
    pub(crate) fn can_trigger(&self, now: f64, debounce: f64) -> bool {
        if self.occupied || self.state.is_empty() {
            return false;
        }
        match self.last_trigger {
            None => true,
            Some(last) => now - last > debounce,
        }
    }

    pub(crate) fn mark_triggered(&mut self, now: f64) {
        debug_assert!(!self.state.is_empty(), "triggered an empty slot");
        self.occupied = true;
        self.last_trigger = Some(now);
    }

    /// Forget trigger history before the slot is moved onto another object.
    /// Returns whether the occupied flag was set.
    pub(crate) fn rebase(&mut self) -> bool {
        self.last_trigger = None;
        self.release()
    }

    /// Clear the occupied flag. Returns whether it was set.
    pub(crate) fn release(&mut self) -> bool {
        std::mem::replace(&mut self.occupied, false)
    }
}
