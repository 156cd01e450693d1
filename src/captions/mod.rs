//! Time-synchronised caption cues shown alongside the conversation track.
//!
//! The sequence is lazy: cue `n` is shown, then cue `n + 1` is scheduled after cue
//! `n`'s own duration. Stopping only flips a flag that every scheduled cue checks, so
//! timers already in the queue are left to expire harmlessly.

mod srt;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub use srt::{parse_srt, Cue};

use crate::events::{Io, Timer};
use crate::{log_debug, log_debug_content};

/// Where caption tracks come from.
pub trait CaptionSource {
    fn cues(&self, track: &str) -> Vec<Cue>;
}

/// `<dir>/<track>.srt` files on disk.
#[derive(Debug, Clone)]
pub struct CaptionDir {
    dir: PathBuf,
}

impl CaptionDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CaptionSource for CaptionDir {
    fn cues(&self, track: &str) -> Vec<Cue> {
        let path = self.dir.join(format!("{track}.srt"));
        match fs::read_to_string(&path) {
            Ok(text) => parse_srt(&text),
            Err(err) => {
                log_debug(&format!("caption track {} unreadable: {err}", path.display()));
                Vec::new()
            }
        }
    }
}

/// In-memory tracks, keyed by track name.
#[derive(Debug, Clone, Default)]
pub struct CaptionMap {
    tracks: HashMap<String, Vec<Cue>>,
}

impl CaptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, track: impl Into<String>, cues: Vec<Cue>) {
        self.tracks.insert(track.into(), cues);
    }
}

impl CaptionSource for CaptionMap {
    fn cues(&self, track: &str) -> Vec<Cue> {
        self.tracks.get(track).cloned().unwrap_or_default()
    }
}

pub struct CaptionSequencer {
    source: Box<dyn CaptionSource>,
    cues: Vec<Cue>,
    /// Bumped on every start so cues queued by an earlier run are recognised as stale.
    epoch: u64,
    continuing: bool,
    shown: usize,
}

impl CaptionSequencer {
    pub fn new(source: Box<dyn CaptionSource>) -> Self {
        Self {
            source,
            cues: Vec::new(),
            epoch: 0,
            continuing: false,
            shown: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.continuing
    }

    /// Number of cues displayed by the current run.
    pub fn shown(&self) -> usize {
        self.shown
    }

    /// Start `track` from its first cue, abandoning any earlier run.
    pub fn start(&mut self, track: &str, io: &mut Io<'_>) {
        self.cues = self.source.cues(track);
        self.epoch += 1;
        self.shown = 0;
        if self.cues.is_empty() {
            log_debug(&format!("no captions for track {track:?}"));
            self.continuing = false;
            return;
        }
        self.continuing = true;
        self.on_cue(self.epoch, 0, io);
    }

    pub fn stop(&mut self) {
        self.continuing = false;
    }

    /// Scheduled cue expiry.
    pub fn on_cue(&mut self, epoch: u64, cue: usize, io: &mut Io<'_>) {
        if epoch != self.epoch || !self.continuing {
            return;
        }
        let Some(current) = self.cues.get(cue) else {
            self.continuing = false;
            return;
        };
        io.show_text(current.text.clone());
        log_debug_content(&format!("caption {cue}: {}", current.text));
        self.shown += 1;

        if cue + 1 < self.cues.len() {
            io.timers.after(
                io.now,
                Duration::from_millis(current.duration_ms()),
                Timer::CaptionCue {
                    epoch,
                    cue: cue + 1,
                },
            );
        } else {
            self.continuing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Effect;
    use crate::timer::TimerScheduler;
    use crossbeam_channel::unbounded;
    use std::time::Instant;

    fn cue(start_ms: u64, end_ms: u64, text: &str) -> Cue {
        Cue {
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }

    fn sequencer() -> CaptionSequencer {
        let mut map = CaptionMap::new();
        map.insert(
            "call",
            vec![cue(0, 1000, "one"), cue(1000, 1500, "two"), cue(1500, 3000, "three")],
        );
        CaptionSequencer::new(Box::new(map))
    }

    fn run_until(
        seq: &mut CaptionSequencer,
        timers: &mut TimerScheduler<Timer>,
        effects: &crossbeam_channel::Sender<Effect>,
        until: Instant,
    ) {
        while let Some((_, timer)) = timers.pop_due(until) {
            if let Timer::CaptionCue { epoch, cue } = timer {
                let mut io = Io {
                    now: until,
                    timers: &mut *timers,
                    effects,
                };
                seq.on_cue(epoch, cue, &mut io);
            }
        }
    }

    fn texts(rx: &crossbeam_channel::Receiver<Effect>) -> Vec<String> {
        rx.try_iter()
            .filter_map(|effect| match effect {
                Effect::ShowText(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn shows_first_cue_immediately_and_chains_by_duration() {
        let (tx, rx) = unbounded();
        let mut timers = TimerScheduler::new();
        let now = Instant::now();
        let mut seq = sequencer();
        seq.start(
            "call",
            &mut Io {
                now,
                timers: &mut timers,
                effects: &tx,
            },
        );
        assert_eq!(texts(&rx), vec!["one"]);
        assert_eq!(timers.next_deadline(), Some(now + Duration::from_millis(1000)));

        run_until(&mut seq, &mut timers, &tx, now + Duration::from_millis(1000));
        assert_eq!(texts(&rx), vec!["two"]);
        assert_eq!(timers.next_deadline(), Some(now + Duration::from_millis(1500)));

        run_until(&mut seq, &mut timers, &tx, now + Duration::from_millis(1500));
        assert_eq!(texts(&rx), vec!["three"]);
        assert!(timers.is_empty());
        assert!(!seq.is_running());
        assert_eq!(seq.shown(), 3);
    }

    #[test]
    fn stop_halts_before_next_display() {
        let (tx, rx) = unbounded();
        let mut timers = TimerScheduler::new();
        let now = Instant::now();
        let mut seq = sequencer();
        seq.start(
            "call",
            &mut Io {
                now,
                timers: &mut timers,
                effects: &tx,
            },
        );
        seq.stop();
        // The queued cue is not cancelled, it just expires without output.
        assert_eq!(timers.len(), 1);
        run_until(&mut seq, &mut timers, &tx, now + Duration::from_secs(10));
        assert_eq!(texts(&rx), vec!["one"]);
    }

    #[test]
    fn restart_begins_at_first_cue_and_ignores_stale_timers() {
        let (tx, rx) = unbounded();
        let mut timers = TimerScheduler::new();
        let now = Instant::now();
        let mut seq = sequencer();
        seq.start(
            "call",
            &mut Io {
                now,
                timers: &mut timers,
                effects: &tx,
            },
        );
        let later = now + Duration::from_millis(200);
        seq.start(
            "call",
            &mut Io {
                now: later,
                timers: &mut timers,
                effects: &tx,
            },
        );
        assert_eq!(texts(&rx), vec!["one", "one"]);

        // The first run's cue at +1000 ms is stale; the second run's fires at +1200 ms.
        run_until(&mut seq, &mut timers, &tx, now + Duration::from_millis(1000));
        assert!(texts(&rx).is_empty());
        run_until(&mut seq, &mut timers, &tx, later + Duration::from_millis(1000));
        assert_eq!(texts(&rx), vec!["two"]);
    }

    #[test]
    fn missing_track_shows_nothing() {
        let (tx, rx) = unbounded();
        let mut timers = TimerScheduler::new();
        let mut seq = sequencer();
        seq.start(
            "nope",
            &mut Io {
                now: Instant::now(),
                timers: &mut timers,
                effects: &tx,
            },
        );
        assert!(texts(&rx).is_empty());
        assert!(!seq.is_running());
        assert!(timers.is_empty());
    }

    #[test]
    fn caption_dir_reads_srt_files() {
        let dir = std::env::temp_dir().join(format!("switchboard_captions_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("track.srt"), "1\n00:00:00,000 --> 00:00:01,000\nHi\n").unwrap();
        let source = CaptionDir::new(&dir);
        assert_eq!(source.cues("track").len(), 1);
        assert!(source.cues("absent").is_empty());
    }
}
