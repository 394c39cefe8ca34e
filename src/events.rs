//! Trigger/release events and the sinks that consume them.
//!
//! The tracker never plays sounds or writes files itself. It hands each
//! event to an [`EventSink`]; what happens next (audio, recording, drawing)
//! is the sink's business and cannot affect tracking.

use serde::{Deserialize, Serialize};

/// A slot went from empty to occupied (note-on).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub slot: usize,
    /// Seconds, from the tracker's clock.
    pub timestamp: f64,
    /// Note symbol for the slot, if the note map covers it.
    pub note: Option<char>,
}

/// A triggered slot lost its object (note-off).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub slot: usize,
    pub timestamp: f64,
}

/// Consumer of tracker events.
pub trait EventSink {
    fn on_trigger(&mut self, event: &TriggerEvent);

    fn on_release(&mut self, _event: &ReleaseEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_trigger(&mut self, event: &TriggerEvent) {
        (**self).on_trigger(event);
    }

    fn on_release(&mut self, event: &ReleaseEvent) {
        (**self).on_release(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn on_trigger(&mut self, event: &TriggerEvent) {
        (**self).on_trigger(event);
    }

    fn on_release(&mut self, event: &ReleaseEvent) {
        (**self).on_release(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_trigger(&mut self, _event: &TriggerEvent) {}
}

/// Either kind of event, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoggedEvent {
    Trigger(TriggerEvent),
    Release(ReleaseEvent),
}

/// Append-only log of every event the tracker emitted.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in emission order.
    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn triggers(&self) -> Vec<TriggerEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LoggedEvent::Trigger(t) => Some(*t),
                LoggedEvent::Release(_) => None,
            })
            .collect()
    }

    pub fn releases(&self) -> Vec<ReleaseEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LoggedEvent::Release(r) => Some(*r),
                LoggedEvent::Trigger(_) => None,
            })
            .collect()
    }

    /// Triggers for one slot, oldest first.
    pub fn triggers_for(&self, slot: usize) -> Vec<TriggerEvent> {
        self.triggers().into_iter().filter(|t| t.slot == slot).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventLog {
    fn on_trigger(&mut self, event: &TriggerEvent) {
        self.events.push(LoggedEvent::Trigger(*event));
    }

    fn on_release(&mut self, event: &ReleaseEvent) {
        self.events.push(LoggedEvent::Release(*event));
    }
}

/// Maps slot indices to single-character note symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteMap {
    symbols: Vec<char>,
}

impl NoteMap {
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
        }
    }

    /// Note played by `slot`, if the map is long enough.
    pub fn note_for(&self, slot: usize) -> Option<char> {
        self.symbols.get(slot).copied()
    }

    pub fn contains(&self, note: char) -> bool {
        self.symbols.contains(&note)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for NoteMap {
    /// The six harp strings, left to right.
    fn default() -> Self {
        Self::new(['A', 'B', 'C', 'D', 'E', 'F'])
    }
}
