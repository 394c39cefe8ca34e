//! # Laser Harp - Beam Slot Tracker
//!
//! A camera watches a row of light beams; every time a finger interrupts a beam
//! a note should sound. The color-segmentation front end only produces an
//! unordered cloud of 2D centroids per frame. This crate turns that cloud into
//! a fixed set of persistent slots (one per beam) and a stream of debounced
//! note triggers.
//!
//! ## Features
//!
//! - Fixed slot count with left-to-right bulk initialization
//! - Globally optimal slot/detection assignment (Hungarian) with distance gating
//! - Re-acquisition of a slot's original object after temporary occlusion
//! - Debounced trigger and release events delivered to a pluggable [`EventSink`]
//! - CSV record/playback of note events
//!
//! ## Example
//!
//! ```rust
//! use laser_harp::{Detection, Tracker, TrackerConfig};
//!
//! let config = TrackerConfig::new(30.0, 3);
//! let mut tracker = Tracker::new(config).unwrap();
//!
//! let frame = vec![
//!     Detection::new(30.0, 5.0).unwrap(),
//!     Detection::new(10.0, 5.0).unwrap(),
//!     Detection::new(20.0, 5.0).unwrap(),
//! ];
//! let positions = tracker.update_at(frame, 0.0);
//!
//! assert_eq!(positions.len(), 3);
//! assert_eq!(tracker.sink().triggers().len(), 3);
//! ```

// Internal modules (ports of scipy)
pub(crate) mod internal;

// Public modules
pub mod clock;
pub mod detection;
pub mod events;
pub mod matching;
pub mod recording;
pub mod slot;
pub mod tracker;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use detection::{Detection, Point};
pub use events::{EventLog, EventSink, LoggedEvent, NoteMap, NullSink, ReleaseEvent, TriggerEvent};
pub use recording::{LoggingPlayer, NotePlayer, NoteRecord, Playback, PlaybackSummary, Recording};
pub use slot::{Slot, SlotState};
pub use tracker::{Tracker, TrackerConfig};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the laser harp library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid detection: {0}")]
        InvalidDetection(String),

        #[error("Invalid recording: {0}")]
        InvalidRecording(String),

        #[error("Unknown note: {0:?}")]
        UnknownNote(char),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("CSV error: {0}")]
        Csv(#[from] csv::Error),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),
    }

    /// Result type for laser harp operations
    pub type Result<T> = std::result::Result<T, Error>;
}
