//! Offline driver for the laser harp tracker.
//!
//! Usage:
//!     laser-harp-replay track --frames session.jsonl --record recording.csv
//!     laser-harp-replay play recording.csv
//!
//! `track` feeds a detection log through the tracker, one JSON object per
//! line: `{"t": 12.5, "points": [[101.0, 240.0], [180.0, 238.5]]}`.
//! `play` replays a recording CSV through a logging note player.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use laser_harp::{
    Detection, LoggingPlayer, NoteMap, Playback, Recording, Tracker, TrackerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "laser-harp-replay", about = "Replay detection logs and note recordings")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a detection log through the tracker
    Track {
        /// JSON-lines file of frames
        #[arg(long, value_name = "PATH")]
        frames: PathBuf,
        /// Tracker configuration (JSON); flags below override it
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        #[arg(long)]
        max_distance: Option<f64>,
        #[arg(long)]
        max_objects: Option<usize>,
        /// Debounce interval in seconds
        #[arg(long)]
        debounce: Option<f64>,
        /// Note symbols for slots 0.., e.g. "ABCDEF"
        #[arg(long)]
        notes: Option<String>,
        /// Write triggered notes to this CSV
        #[arg(long, value_name = "PATH")]
        record: Option<PathBuf>,
    },
    /// Replay a recording CSV
    Play {
        #[arg(value_name = "PATH")]
        recording: PathBuf,
        /// Skip the waits between notes
        #[arg(long)]
        no_wait: bool,
    },
}

#[derive(Debug, Deserialize)]
struct FrameLine {
    t: f64,
    #[serde(default)]
    points: Vec<[f64; 2]>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Track {
            frames,
            config,
            max_distance,
            max_objects,
            debounce,
            notes,
            record,
        } => {
            let mut tracker_config = match config {
                Some(path) => TrackerConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => TrackerConfig::default(),
            };
            if let Some(v) = max_distance {
                tracker_config.max_distance = v;
            }
            if let Some(v) = max_objects {
                tracker_config.max_objects = v;
            }
            if let Some(v) = debounce {
                tracker_config.debounce_interval = v;
            }
            let note_map = notes.map_or_else(NoteMap::default, |s| NoteMap::new(s.chars()));

            run_track(tracker_config, note_map, &frames, record)
        }
        Command::Play { recording, no_wait } => run_play(&recording, no_wait),
    }
}

fn run_track(
    config: TrackerConfig,
    notes: NoteMap,
    frames: &Path,
    record: Option<PathBuf>,
) -> Result<()> {
    let mut tracker = Tracker::new(config)
        .context("invalid tracker configuration")?
        .with_notes(notes);

    let file = File::open(frames).with_context(|| format!("opening {}", frames.display()))?;
    let mut frame_count = 0usize;

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameLine = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: bad frame", frames.display(), idx + 1))?;

        // A frame with a broken point is treated as an empty frame.
        let detections = match frame
            .points
            .iter()
            .map(|&p| Detection::try_from(p))
            .collect::<laser_harp::Result<Vec<_>>>()
        {
            Ok(detections) => detections,
            Err(e) => {
                warn!(line = idx + 1, error = %e, "dropping invalid frame");
                Vec::new()
            }
        };

        tracker.update_at(detections, frame.t);
        frame_count += 1;
    }

    let log = tracker.into_sink();
    info!(
        frames = frame_count,
        triggers = log.triggers().len(),
        releases = log.releases().len(),
        "replay finished"
    );

    if let Some(path) = record {
        let recording = Recording::from_events(&log);
        recording
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(notes = recording.len(), path = %path.display(), "recording saved");
    }

    Ok(())
}

fn run_play(path: &Path, no_wait: bool) -> Result<()> {
    let recording =
        Recording::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    if recording.is_empty() {
        bail!("no recordings found in {}", path.display());
    }

    info!(
        notes = recording.len(),
        seconds = recording.duration(),
        "replaying recording"
    );

    let mut player = LoggingPlayer::new(NoteMap::default());
    let playback = Playback::new(&recording);
    let summary = if no_wait {
        playback.play_with(&mut player, |_| {})
    } else {
        playback.play(&mut player)
    };

    info!(played = summary.played, failed = summary.failed, "playback finished");
    Ok(())
}
