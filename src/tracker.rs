//! Main tracker implementation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::events::{EventLog, EventSink, NoteMap, ReleaseEvent, TriggerEvent};
use crate::matching::{build_cost_matrix, get_unmatched, match_slots_and_detections};
use crate::slot::{Slot, SlotState};
use crate::{Detection, Error, Point, Result};

/// Configuration for the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Gating threshold, in detection coordinate units. A detection continues
    /// a slot only if it lies strictly closer than this.
    pub max_distance: f64,

    /// Number of slots (beams). Fixed for the tracker's lifetime.
    pub max_objects: usize,

    /// Minimum time in seconds between two triggers on the same slot.
    pub debounce_interval: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_distance: 30.0,
            max_objects: 6,
            debounce_interval: 0.25,
        }
    }
}

impl TrackerConfig {
    /// Create a new tracker configuration with the default debounce interval.
    ///
    /// # Arguments
    /// * `max_distance` - Gating threshold
    /// * `max_objects` - Slot count
    pub fn new(max_distance: f64, max_objects: usize) -> Self {
        Self {
            max_distance,
            max_objects,
            ..Self::default()
        }
    }

    pub fn with_debounce_interval(mut self, seconds: f64) -> Self {
        self.debounce_interval = seconds;
        self
    }

    /// Check the ranges: `max_distance > 0`, `max_objects >= 1`,
    /// `debounce_interval >= 0`, all finite.
    pub fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_distance must be a positive finite number, got {}",
                self.max_distance
            )));
        }

        if self.max_objects == 0 {
            return Err(Error::InvalidConfig(
                "max_objects must be at least 1".to_string(),
            ));
        }

        if !self.debounce_interval.is_finite() || self.debounce_interval < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "debounce_interval must be a non-negative finite number, got {}",
                self.debounce_interval
            )));
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Beam slot tracker.
///
/// Maintains `max_objects` persistent slots, assigns each frame's detections
/// to them and reports trigger/release transitions to an [`EventSink`].
/// `update` mutates slot state in place; a tracker must be driven from one
/// frame loop, one frame at a time.
pub struct Tracker<S: EventSink = EventLog> {
    config: TrackerConfig,

    /// One slot per beam, indexed `0..max_objects`.
    slots: Vec<Slot>,

    /// Whether bulk initialization has happened.
    initialized: bool,

    notes: NoteMap,
    clock: Box<dyn Clock>,
    sink: S,
}

impl Tracker<EventLog> {
    /// Create a new tracker that records its events in an [`EventLog`].
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::with_sink(config, EventLog::new())
    }
}

impl<S: EventSink> Tracker<S> {
    /// Create a new tracker delivering events to `sink`.
    pub fn with_sink(config: TrackerConfig, sink: S) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            slots: (0..config.max_objects).map(Slot::new).collect(),
            initialized: false,
            notes: NoteMap::default(),
            clock: Box::new(SystemClock),
            sink,
        })
    }

    /// Replace the time source used by [`Tracker::update`].
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the slot-to-note mapping used for trigger events.
    pub fn with_notes(mut self, notes: NoteMap) -> Self {
        self.notes = notes;
        self
    }

    /// Update the tracker with this frame's detections, timestamped by the
    /// tracker's clock.
    ///
    /// # Returns
    /// One entry per slot, in slot order: the slot's position or `None`.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<Option<Point>> {
        let now = self.clock.now();
        self.update_at(detections, now)
    }

    /// Update the tracker with this frame's detections observed at `now`
    /// (seconds).
    pub fn update_at(&mut self, mut detections: Vec<Detection>, now: f64) -> Vec<Option<Point>> {
        // A frame with no detections is a transient gap: keep positions,
        // but allow every slot to re-trigger once it is matched again.
        if detections.is_empty() {
            for slot in &mut self.slots {
                if slot.release() {
                    self.sink.on_release(&ReleaseEvent {
                        slot: slot.index(),
                        timestamp: now,
                    });
                }
            }
            debug!(timestamp = now, "empty frame, positions held");
            return self.positions();
        }

        // Left-to-right order fixes which beam maps to which slot. The sort
        // is stable, so equal x keeps detector order.
        detections.sort_by(|a, b| a.x().total_cmp(&b.x()));

        let num_slots = self.slots.len();
        if detections.len() > num_slots {
            debug!(
                detections = detections.len(),
                slots = num_slots,
                "more detections than slots, excess will be dropped"
            );
        }

        if !self.initialized && detections.len() >= num_slots {
            self.bulk_initialize(&detections, now);
        }

        let previous = self.positions();
        let cost_matrix = build_cost_matrix(&previous, &detections);
        let (matched_slots, matched_dets) =
            match_slots_and_detections(&cost_matrix, self.config.max_distance);

        let mut next: Vec<Option<Point>> = vec![None; num_slots];
        for (&slot_idx, &det_idx) in matched_slots.iter().zip(matched_dets.iter()) {
            next[slot_idx] = Some(detections[det_idx].point());
        }

        let mut free = get_unmatched(detections.len(), &matched_dets);
        let claimed = self.claim_free_detections(&mut next, &mut free, &detections);

        let (triggered, released) = self.commit(&next, now);

        debug!(
            timestamp = now,
            detections = detections.len(),
            matched = matched_slots.len(),
            claimed,
            triggered,
            released,
            dropped = free.len(),
            "frame processed"
        );

        next
    }

    /// Anchor slot `i` to the i-th leftmost detection. Runs once.
    ///
    /// Slots may already hold objects claimed during startup. A slot whose
    /// anchor is not within `max_distance` of what it held now follows a
    /// different object: its trigger state is reset and a release is emitted
    /// if it was occupied, so the new object triggers on its own.
    fn bulk_initialize(&mut self, sorted_detections: &[Detection], now: f64) {
        let max_distance = self.config.max_distance;

        for (slot, detection) in self.slots.iter_mut().zip(sorted_detections) {
            let same_object = slot
                .position()
                .is_some_and(|held| detection.distance_to(&held) < max_distance);

            if !same_object && slot.rebase() {
                self.sink.on_release(&ReleaseEvent {
                    slot: slot.index(),
                    timestamp: now,
                });
            }
            slot.anchor(detection.point());
        }
        self.initialized = true;

        info!(
            slots = self.slots.len(),
            detections = sorted_detections.len(),
            "bulk initialization"
        );
    }

    /// Give every slot left without a match a chance to claim one of the
    /// `free` detections, in slot order then left-to-right.
    ///
    /// A slot with a reference position only claims a detection closer than
    /// `max_distance` to that reference. A slot that never held a position
    /// claims the first free detection without any distance check.
    ///
    /// Returns the number of claims.
    fn claim_free_detections(
        &self,
        next: &mut [Option<Point>],
        free: &mut Vec<usize>,
        detections: &[Detection],
    ) -> usize {
        let mut claimed = 0;

        for (slot, position) in self.slots.iter().zip(next.iter_mut()) {
            if position.is_some() {
                continue;
            }
            if free.is_empty() {
                break;
            }

            let pick = if slot.has_history() {
                free.iter().position(|&j| {
                    slot.reference_position().is_some_and(|reference| {
                        detections[j].distance_to(&reference) < self.config.max_distance
                    })
                })
            } else {
                Some(0)
            };

            if let Some(k) = pick {
                let det_idx = free.remove(k);
                *position = Some(detections[det_idx].point());
                claimed += 1;
            }
        }

        claimed
    }

    /// Write this frame's positions into the slots and emit the resulting
    /// trigger and release events in slot order.
    ///
    /// Returns (triggers, releases) emitted.
    fn commit(&mut self, next: &[Option<Point>], now: f64) -> (usize, usize) {
        let debounce = self.config.debounce_interval;
        let mut triggered = 0;
        let mut released = 0;

        for (slot, position) in self.slots.iter_mut().zip(next) {
            match *position {
                Some(point) => {
                    slot.set_state(SlotState::Occupied(point));

                    if slot.can_trigger(now, debounce) {
                        slot.mark_triggered(now);
                        let event = TriggerEvent {
                            slot: slot.index(),
                            timestamp: now,
                            note: self.notes.note_for(slot.index()),
                        };
                        info!(slot = event.slot, note = ?event.note, timestamp = now, "trigger");
                        self.sink.on_trigger(&event);
                        triggered += 1;
                    }
                }
                None => {
                    if slot.release() {
                        self.sink.on_release(&ReleaseEvent {
                            slot: slot.index(),
                            timestamp: now,
                        });
                        released += 1;
                    }
                    slot.set_state(SlotState::Empty);
                }
            }
        }

        (triggered, released)
    }

    /// Current position of every slot, in slot order.
    pub fn positions(&self) -> Vec<Option<Point>> {
        self.slots.iter().map(Slot::position).collect()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Number of slots currently holding a position.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.position().is_some()).count()
    }

    /// Configuration the tracker was validated with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn notes(&self) -> &NoteMap {
        &self.notes
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
