use std::time::{Duration, Instant};

use super::AudioDeck;
use crate::events::{AudioChannel, TrackToken};

/// Plays nothing; every track "ends" a fixed time after it starts.
#[derive(Debug)]
pub struct MutedDeck {
    track_len: Duration,
    playing: [Option<(TrackToken, Instant)>; 3],
}

impl MutedDeck {
    pub fn new(track_len: Duration) -> Self {
        Self {
            track_len,
            playing: [None; 3],
        }
    }
}

impl AudioDeck for MutedDeck {
    fn play(&mut self, channel: AudioChannel, _media: &str, token: TrackToken, now: Instant) {
        self.playing[channel.slot()] = Some((token, now + self.track_len));
    }

    fn stop(&mut self, channel: AudioChannel) {
        self.playing[channel.slot()] = None;
    }

    fn poll_finished(&mut self, now: Instant) -> Vec<(AudioChannel, TrackToken)> {
        let mut finished = Vec::new();
        for channel in AudioChannel::ALL {
            let slot = &mut self.playing[channel.slot()];
            if let Some((token, ends_at)) = *slot {
                if ends_at <= now {
                    *slot = None;
                    finished.push((channel, token));
                }
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_finishes_once_after_its_length() {
        let mut deck = MutedDeck::new(Duration::from_millis(1500));
        let start = Instant::now();
        deck.play(AudioChannel::Tone, "outgoing-ring", TrackToken(4), start);
        assert!(deck
            .poll_finished(start + Duration::from_millis(1499))
            .is_empty());
        assert_eq!(
            deck.poll_finished(start + Duration::from_millis(1500)),
            vec![(AudioChannel::Tone, TrackToken(4))]
        );
        assert!(deck.poll_finished(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn stopped_or_replaced_tracks_are_not_reported() {
        let mut deck = MutedDeck::new(Duration::from_millis(100));
        let start = Instant::now();
        deck.play(AudioChannel::Ring, "buzzer", TrackToken(1), start);
        deck.stop(AudioChannel::Ring);
        deck.play(AudioChannel::Conversation, "a", TrackToken(2), start);
        deck.play(AudioChannel::Conversation, "b", TrackToken(3), start);
        assert_eq!(
            deck.poll_finished(start + Duration::from_secs(1)),
            vec![(AudioChannel::Conversation, TrackToken(3))]
        );
    }
}
