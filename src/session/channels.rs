//! Per-channel playback bookkeeping and single-shot end-of-track subscriptions.

use crate::events::{AudioChannel, Effect, Io, PersonId, TrackToken};

/// What to do when the subscribed track on a channel finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackHook {
    /// Outgoing tone ended on a correct connection.
    StartConversation,
    /// Outgoing tone ended on a wrong connection; this person answers.
    WrongNumberMessage(PersonId),
    /// Wrong-number message ended; the caller asks again.
    RequestCorrectNumber,
    /// A greeting-only call is over.
    GreetingOnlyFinished,
    /// The full conversation track is over.
    CallCompleted,
}

#[derive(Debug, Clone, Copy)]
struct NowPlaying {
    token: TrackToken,
    hook: Option<TrackHook>,
}

/// Tracks what each channel is playing so stale end-of-track reports can be told apart.
#[derive(Debug, Default)]
pub struct AudioChannels {
    playing: [Option<NowPlaying>; 3],
    next_token: u64,
}

impl AudioChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `media` on `channel`, replacing whatever was there and its subscription.
    pub fn play(
        &mut self,
        channel: AudioChannel,
        media: &str,
        hook: Option<TrackHook>,
        io: &Io<'_>,
    ) -> TrackToken {
        self.next_token += 1;
        let token = TrackToken(self.next_token);
        if let Some(previous) = self.playing[channel.slot()].take() {
            if let Some(hook) = previous.hook {
                crate::log_debug(&format!(
                    "{} channel: detaching {hook:?} before new track",
                    channel.label()
                ));
            }
        }
        self.playing[channel.slot()] = Some(NowPlaying { token, hook });
        let _ = io.effects.send(Effect::Play {
            channel,
            media: media.to_string(),
            token,
        });
        token
    }

    /// Stop `channel` and detach its subscription.
    pub fn stop(&mut self, channel: AudioChannel, io: &Io<'_>) {
        self.playing[channel.slot()] = None;
        let _ = io.effects.send(Effect::Stop(channel));
    }

    pub fn stop_all(&mut self, io: &Io<'_>) {
        for channel in AudioChannel::ALL {
            self.stop(channel, io);
        }
    }

    /// Detach and return the hook for a finished track. Returns `None` for a track that
    /// was superseded or stopped, and for any second report of the same track.
    pub fn take_hook(&mut self, channel: AudioChannel, token: TrackToken) -> Option<TrackHook> {
        let slot = &mut self.playing[channel.slot()];
        match slot {
            Some(now) if now.token == token => slot.take().and_then(|now| now.hook),
            _ => None,
        }
    }

    pub fn hook(&self, channel: AudioChannel) -> Option<TrackHook> {
        self.playing[channel.slot()].and_then(|now| now.hook)
    }

    pub fn current_token(&self, channel: AudioChannel) -> Option<TrackToken> {
        self.playing[channel.slot()].map(|now| now.token)
    }
}
