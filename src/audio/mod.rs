//! Playback for the three exhibit channels.
//!
//! A deck lives on the surface thread because rodio's output stream is not `Send`.
//! The thread forwards `Play` / `Stop` effects to it and polls for finished tracks,
//! which go back to the event loop as end-of-track reports carrying the request's
//! token.

mod muted;
#[cfg(feature = "rodio-output")]
mod rodio_deck;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub use muted::MutedDeck;
#[cfg(feature = "rodio-output")]
pub use rodio_deck::RodioDeck;

use crate::config::AppConfig;
use crate::events::{AudioChannel, TrackToken};
use crate::log_debug;

/// Media refs resolve to `<audio_dir>/<ref>.mp3`.
pub const MEDIA_EXTENSION: &str = "mp3";

pub trait AudioDeck {
    /// Replace whatever `channel` is playing with `media`.
    fn play(&mut self, channel: AudioChannel, media: &str, token: TrackToken, now: Instant);

    /// Silence `channel`. A stopped track is never reported as finished.
    fn stop(&mut self, channel: AudioChannel);

    /// Tracks that ran to completion since the last poll.
    fn poll_finished(&mut self, now: Instant) -> Vec<(AudioChannel, TrackToken)>;

    fn stop_all(&mut self) {
        for channel in AudioChannel::ALL {
            self.stop(channel);
        }
    }
}

pub fn media_path(audio_dir: &Path, media: &str) -> PathBuf {
    audio_dir.join(format!("{media}.{MEDIA_EXTENSION}"))
}

/// Open the deck the config asks for. Must be called on the thread that will own it.
pub fn open_deck(config: &AppConfig) -> Box<dyn AudioDeck> {
    let track_len = Duration::from_millis(config.mute_track_ms);
    if config.mute {
        log_debug("audio muted; tracks end after a fixed delay");
        return Box::new(MutedDeck::new(track_len));
    }
    #[cfg(feature = "rodio-output")]
    {
        match RodioDeck::open(&config.audio_dir) {
            Ok(deck) => return Box::new(deck),
            Err(err) => log_debug(&format!("audio output unavailable, muting: {err:#}")),
        }
    }
    #[cfg(not(feature = "rodio-output"))]
    log_debug("built without audio output; muting");
    Box::new(MutedDeck::new(track_len))
}
