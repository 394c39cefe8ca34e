//! Note recordings: a timestamp-sorted list of `(seconds, note)` rows.
//!
//! On disk a recording is CSV with a header row:
//!
//! ```text
//! timestamp,note
//! 1718000000.125,A
//! 1718000000.5,C
//! ```
//!
//! Playback waits for the gap between consecutive timestamps before each
//! note, so only relative timing matters.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::events::{EventLog, NoteMap, TriggerEvent};
use crate::{Error, Result};

const HEADER: [&str; 2] = ["timestamp", "note"];

/// One recorded note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Seconds.
    pub timestamp: f64,
    pub note: char,
}

/// A timestamp-ordered sequence of notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    records: Vec<NoteRecord>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a recording from trigger events. Triggers without a note
    /// symbol are skipped.
    pub fn from_triggers<'a, I>(triggers: I) -> Self
    where
        I: IntoIterator<Item = &'a TriggerEvent>,
    {
        let mut recording = Self::new();
        for trigger in triggers {
            if let Some(note) = trigger.note {
                recording.push(NoteRecord {
                    timestamp: trigger.timestamp,
                    note,
                });
            }
        }
        recording
    }

    /// Build a recording from every trigger in an event log.
    pub fn from_events(log: &EventLog) -> Self {
        Self::from_triggers(&log.triggers())
    }

    /// Insert a record, keeping timestamp order. Records with equal
    /// timestamps keep insertion order.
    pub fn push(&mut self, record: NoteRecord) {
        let at = self
            .records
            .partition_point(|r| r.timestamp <= record.timestamp);
        self.records.insert(at, record);
    }

    pub fn records(&self) -> &[NoteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seconds between the first and last note.
    pub fn duration(&self) -> f64 {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Parse CSV. The first row is a header and is skipped whatever it says;
    /// rows are re-sorted by timestamp.
    ///
    /// # Errors
    /// `Error::InvalidRecording` for a row with a missing field, a
    /// non-numeric timestamp, or a note that is not exactly one character.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for (row, result) in csv_reader.records().enumerate() {
            let record = result?;
            // +2: one for the header, one for 1-based line numbers.
            let line = row + 2;

            let timestamp_field = record.get(0).ok_or_else(|| {
                Error::InvalidRecording(format!("line {}: missing timestamp", line))
            })?;
            let note_field = record.get(1).ok_or_else(|| {
                Error::InvalidRecording(format!("line {}: missing note", line))
            })?;

            let timestamp: f64 = timestamp_field.parse().map_err(|e| {
                Error::InvalidRecording(format!(
                    "line {}: bad timestamp {:?}: {}",
                    line, timestamp_field, e
                ))
            })?;
            if !timestamp.is_finite() {
                return Err(Error::InvalidRecording(format!(
                    "line {}: timestamp must be finite",
                    line
                )));
            }

            let mut chars = note_field.chars();
            let note = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(Error::InvalidRecording(format!(
                        "line {}: note must be a single character, got {:?}",
                        line, note_field
                    )))
                }
            };

            records.push(NoteRecord { timestamp, note });
        }

        records.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Ok(Self { records })
    }

    /// Load a recording from a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_csv(file)
    }

    /// Write the header and every row as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(HEADER)?;
        for record in &self.records {
            csv_writer.write_record([record.timestamp.to_string(), record.note.to_string()])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Save the recording to a CSV file, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

/// Something that can sound a note.
pub trait NotePlayer {
    fn play(&mut self, note: char) -> Result<()>;
}

/// Player that logs each note and rejects symbols outside its note map.
#[derive(Debug, Clone, Default)]
pub struct LoggingPlayer {
    notes: NoteMap,
    played: Vec<char>,
}

impl LoggingPlayer {
    pub fn new(notes: NoteMap) -> Self {
        Self {
            notes,
            played: Vec::new(),
        }
    }

    /// Notes accepted so far.
    pub fn played(&self) -> &[char] {
        &self.played
    }
}

impl NotePlayer for LoggingPlayer {
    fn play(&mut self, note: char) -> Result<()> {
        if !self.notes.contains(note) {
            return Err(Error::UnknownNote(note));
        }
        info!(%note, "play");
        self.played.push(note);
        Ok(())
    }
}

/// Outcome of a playback run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub played: usize,
    pub failed: usize,
}

/// Replays a recording with its original relative timing.
#[derive(Debug, Clone, Copy)]
pub struct Playback<'a> {
    recording: &'a Recording,
}

impl<'a> Playback<'a> {
    pub fn new(recording: &'a Recording) -> Self {
        Self { recording }
    }

    /// Wait before each note: zero for the first, then the gap since the
    /// previous note. Gaps too large for a `Duration` saturate at
    /// `Duration::MAX`.
    pub fn delays(&self) -> Vec<Duration> {
        let mut previous = self.recording.records.first().map(|r| r.timestamp);
        self.recording
            .records
            .iter()
            .map(|r| {
                let gap = previous.map_or(0.0, |p| r.timestamp - p);
                previous = Some(r.timestamp);
                Duration::try_from_secs_f64(gap.max(0.0)).unwrap_or(Duration::MAX)
            })
            .collect()
    }

    /// Play every note through `player`, calling `sleep` with each delay
    /// first. A note the player fails on is logged and skipped.
    pub fn play_with<P, F>(&self, player: &mut P, mut sleep: F) -> PlaybackSummary
    where
        P: NotePlayer + ?Sized,
        F: FnMut(Duration),
    {
        let mut summary = PlaybackSummary::default();

        for (record, delay) in self.recording.records.iter().zip(self.delays()) {
            if !delay.is_zero() {
                sleep(delay);
            }
            match player.play(record.note) {
                Ok(()) => summary.played += 1,
                Err(e) => {
                    warn!(note = %record.note, timestamp = record.timestamp, error = %e, "failed to play note");
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Play in real time on the current thread.
    pub fn play<P: NotePlayer + ?Sized>(&self, player: &mut P) -> PlaybackSummary {
        self.play_with(player, thread::sleep)
    }
}
