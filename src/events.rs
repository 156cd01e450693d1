//! Messages flowing into and out of the exhibit core.
//!
//! Hardware and audio threads post [`LoopEvent`]s; the core answers with [`Effect`]s
//! sent to the surface thread. Timers are armed with a [`Timer`] payload on the
//! shared [`TimerScheduler`].

use std::fmt;
use std::time::Instant;

use crossbeam_channel::Sender;

use crate::timer::TimerScheduler;

/// Number of jack sense lines. Jack `n`, LED `n` and person `n` are the same index.
pub const JACK_COUNT: usize = 12;

/// Sense lines on the input expander; lines at or above [`JACK_COUNT`] are buttons.
pub const SENSE_LINE_COUNT: u8 = 16;

/// Active-low Start button line.
pub const START_BUTTON_LINE: u8 = 13;

/// A person in the directory. Persons below [`JACK_COUNT`] own a jack and an LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub u8);

impl PersonId {
    /// Map a sense line to a jack, rejecting button lines.
    pub fn from_line(line: u8) -> Option<Self> {
        (usize::from(line) < JACK_COUNT).then_some(Self(line))
    }

    pub fn line(self) -> u8 {
        self.0
    }

    pub fn slot(self) -> usize {
        usize::from(self.0)
    }

    pub fn has_jack(self) -> bool {
        self.slot() < JACK_COUNT
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Validated output of the jack debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlugEvent {
    PlugIn(PersonId),
    Unplug(PersonId),
}

/// The three independent playback channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    Ring,
    Tone,
    Conversation,
}

impl AudioChannel {
    pub const ALL: [AudioChannel; 3] = [
        AudioChannel::Ring,
        AudioChannel::Tone,
        AudioChannel::Conversation,
    ];

    pub fn slot(self) -> usize {
        match self {
            AudioChannel::Ring => 0,
            AudioChannel::Tone => 1,
            AudioChannel::Conversation => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AudioChannel::Ring => "ring",
            AudioChannel::Tone => "tone",
            AudioChannel::Conversation => "conversation",
        }
    }
}

/// Identifies one `play` request; end-of-track reports echo it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackToken(pub u64);

/// Side effects requested by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Play {
        channel: AudioChannel,
        media: String,
        token: TrackToken,
    },
    Stop(AudioChannel),
    ShowText(String),
    SetLed {
        person: PersonId,
        on: bool,
    },
    Shutdown,
}

/// Raw input from the sense-line expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// Some transition happened on this line; the level must be re-read after debounce.
    Edge(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    EndOfTrack {
        channel: AudioChannel,
        token: TrackToken,
    },
}

/// Everything the event loop consumes from other threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Panel(PanelEvent),
    Audio(AudioEvent),
    Quit,
}

/// Payload of every scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Confirm(PersonId),
    Settle(PersonId),
    Wiggle(PersonId),
    InitiateCall,
    ReGreet,
    Blink,
    CaptionCue { epoch: u64, cue: usize },
}

/// Borrowed collaborators handed to every core handler.
pub struct Io<'a> {
    pub now: Instant,
    pub timers: &'a mut TimerScheduler<Timer>,
    pub effects: &'a Sender<Effect>,
}

impl Io<'_> {
    pub fn show_text(&self, text: impl Into<String>) {
        let _ = self.effects.send(Effect::ShowText(text.into()));
    }

    pub fn set_led(&self, person: PersonId, on: bool) {
        if !person.has_jack() {
            crate::log_debug(&format!("no LED for person {person}; ignoring"));
            return;
        }
        let _ = self.effects.send(Effect::SetLed { person, on });
    }
}
