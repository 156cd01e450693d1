//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::{
    DEFAULT_BLINK_MS, DEFAULT_CONFIRM_MS, DEFAULT_FINISHED_TRACK, DEFAULT_MUTE_TRACK_MS,
    DEFAULT_RECALL_DELAY_MS, DEFAULT_RING_TRACK, DEFAULT_SETTLE_MS, DEFAULT_START_DELAY_MS,
    DEFAULT_TONE_TRACK, DEFAULT_WIGGLE_MS,
};

/// CLI options for the switchboard exhibit.
#[derive(Debug, Parser, Clone)]
#[command(about = "Switchboard exhibit: You Are the Operator", author, version)]
pub struct AppConfig {
    /// Conversation script (JSON array of calls)
    #[arg(long, env = "SWITCHBOARD_SCRIPT", default_value = "conversations.json")]
    pub script: PathBuf,

    /// Person directory (JSON array indexed by person id)
    #[arg(long, env = "SWITCHBOARD_PERSONS", default_value = "persons.json")]
    pub persons: PathBuf,

    /// Directory holding `<ref>.mp3` media files
    #[arg(long = "audio-dir", env = "SWITCHBOARD_AUDIO_DIR", default_value = "sb-audio")]
    pub audio_dir: PathBuf,

    /// Directory holding `<ref>.srt` caption tracks
    #[arg(
        long = "captions-dir",
        env = "SWITCHBOARD_CAPTIONS_DIR",
        default_value = "captions"
    )]
    pub captions_dir: PathBuf,

    /// Delay before re-reading a jack after its first edge (milliseconds)
    #[arg(long = "confirm-ms", default_value_t = DEFAULT_CONFIRM_MS)]
    pub confirm_ms: u64,

    /// Quiet period after a confirmed event before the jack is re-armed (milliseconds)
    #[arg(long = "settle-ms", default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,

    /// Delay before re-checking a jostled, already plugged jack (milliseconds)
    #[arg(long = "wiggle-ms", default_value_t = DEFAULT_WIGGLE_MS)]
    pub wiggle_ms: u64,

    /// Caller LED blink interval while ringing (milliseconds)
    #[arg(long = "blink-ms", default_value_t = DEFAULT_BLINK_MS)]
    pub blink_ms: u64,

    /// Delay between Start and the first incoming call (milliseconds)
    #[arg(long = "start-delay-ms", default_value_t = DEFAULT_START_DELAY_MS)]
    pub start_delay_ms: u64,

    /// Delay before a call is re-attempted or the next call rings (milliseconds)
    #[arg(long = "recall-delay-ms", default_value_t = DEFAULT_RECALL_DELAY_MS)]
    pub recall_delay_ms: u64,

    /// Media ref for the incoming-call buzzer
    #[arg(long = "ring-track", default_value = DEFAULT_RING_TRACK)]
    pub ring_track: String,

    /// Media ref for the outgoing ring tone
    #[arg(long = "tone-track", default_value = DEFAULT_TONE_TRACK)]
    pub tone_track: String,

    /// Media ref played once the script is exhausted
    #[arg(long = "finished-track", default_value = DEFAULT_FINISHED_TRACK)]
    pub finished_track: String,

    /// Run without an audio device; tracks "end" after --mute-track-ms
    #[arg(long = "mute", default_value_t = false)]
    pub mute: bool,

    /// Simulated track length when muted (milliseconds)
    #[arg(long = "mute-track-ms", default_value_t = DEFAULT_MUTE_TRACK_MS)]
    pub mute_track_ms: u64,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SWITCHBOARD_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SWITCHBOARD_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging greeting/caption text (debug log only)
    #[arg(
        long = "log-content",
        env = "SWITCHBOARD_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

/// Timings the jack debouncer runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimings {
    pub confirm: Duration,
    pub settle: Duration,
    pub wiggle: Duration,
}

impl Default for DebounceTimings {
    fn default() -> Self {
        Self {
            confirm: Duration::from_millis(DEFAULT_CONFIRM_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            wiggle: Duration::from_millis(DEFAULT_WIGGLE_MS),
        }
    }
}

/// Timings and fixed media refs the call session runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimings {
    pub start_delay: Duration,
    pub recall_delay: Duration,
    pub blink_interval: Duration,
    pub ring_track: String,
    pub tone_track: String,
    pub finished_track: String,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(DEFAULT_START_DELAY_MS),
            recall_delay: Duration::from_millis(DEFAULT_RECALL_DELAY_MS),
            blink_interval: Duration::from_millis(DEFAULT_BLINK_MS),
            ring_track: DEFAULT_RING_TRACK.to_string(),
            tone_track: DEFAULT_TONE_TRACK.to_string(),
            finished_track: DEFAULT_FINISHED_TRACK.to_string(),
        }
    }
}

impl AppConfig {
    pub fn debounce_timings(&self) -> DebounceTimings {
        DebounceTimings {
            confirm: Duration::from_millis(self.confirm_ms),
            settle: Duration::from_millis(self.settle_ms),
            wiggle: Duration::from_millis(self.wiggle_ms),
        }
    }

    pub fn session_timings(&self) -> SessionTimings {
        SessionTimings {
            start_delay: Duration::from_millis(self.start_delay_ms),
            recall_delay: Duration::from_millis(self.recall_delay_ms),
            blink_interval: Duration::from_millis(self.blink_ms),
            ring_track: self.ring_track.clone(),
            tone_track: self.tone_track.clone(),
            finished_track: self.finished_track.clone(),
        }
    }
}
