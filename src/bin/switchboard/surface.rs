//! Surface thread: renders display text and the LED strip, and owns the audio deck.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use switchboard::audio::{open_deck, AudioDeck};
use switchboard::config::AppConfig;
use switchboard::events::{AudioEvent, Effect, LoopEvent, JACK_COUNT};
use switchboard::log_debug;

/// How often finished tracks are polled while no effects arrive.
const SURFACE_POLL_MS: u64 = 25;

pub(crate) fn spawn_surface_thread(
    config: AppConfig,
    effects: Receiver<Effect>,
    events: Sender<LoopEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut deck = open_deck(&config);
        let mut surface = Surface::new(io::stdout());
        let mut running = true;
        while running {
            match effects.recv_timeout(Duration::from_millis(SURFACE_POLL_MS)) {
                Ok(effect) => {
                    running = surface.apply(effect, deck.as_mut());
                    while running {
                        let Ok(effect) = effects.try_recv() else {
                            break;
                        };
                        running = surface.apply(effect, deck.as_mut());
                    }
                    if let Err(err) = surface.flush() {
                        log_debug(&format!("surface write failed: {err}"));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            for (channel, token) in deck.poll_finished(Instant::now()) {
                if events
                    .send(LoopEvent::Audio(AudioEvent::EndOfTrack { channel, token }))
                    .is_err()
                {
                    running = false;
                }
            }
        }
        deck.stop_all();
    })
}

pub(crate) struct Surface<W: Write> {
    out: W,
    leds: [bool; JACK_COUNT],
    leds_dirty: bool,
}

impl<W: Write> Surface<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            leds: [false; JACK_COUNT],
            leds_dirty: false,
        }
    }

    /// Apply one effect. Returns false on shutdown.
    pub(crate) fn apply(&mut self, effect: Effect, deck: &mut dyn AudioDeck) -> bool {
        match effect {
            Effect::Play {
                channel,
                media,
                token,
            } => {
                log_debug(&format!("{} channel: play {media}", channel.label()));
                deck.play(channel, &media, token, Instant::now());
            }
            Effect::Stop(channel) => deck.stop(channel),
            Effect::ShowText(text) => {
                if let Err(err) = self.show_text(&text) {
                    log_debug(&format!("surface write failed: {err}"));
                }
            }
            Effect::SetLed { person, on } => {
                if let Some(led) = self.leds.get_mut(person.slot()) {
                    if *led != on {
                        *led = on;
                        self.leds_dirty = true;
                    }
                }
            }
            Effect::Shutdown => {
                deck.stop_all();
                return false;
            }
        }
        true
    }

    pub(crate) fn leds(&self) -> &[bool; JACK_COUNT] {
        &self.leds
    }

    fn show_text(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Yellow),
            Print(text),
            ResetColor,
            SetAttribute(Attribute::Reset),
            Print("\r\n")
        )
    }

    /// Draw the LED strip if it changed, then flush.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if self.leds_dirty {
            self.leds_dirty = false;
            queue!(self.out, Print("LEDs "))?;
            for (slot, on) in self.leds.iter().enumerate() {
                let (color, glyph) = if *on {
                    (Color::Green, '●')
                } else {
                    (Color::DarkGrey, '○')
                };
                queue!(
                    self.out,
                    Print(format!(" {slot}")),
                    SetForegroundColor(color),
                    Print(glyph),
                    ResetColor
                )?;
            }
            queue!(self.out, Print("\r\n"))?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard::audio::MutedDeck;
    use switchboard::events::{AudioChannel, PersonId, TrackToken};

    fn rendered(surface: &Surface<Vec<u8>>) -> String {
        String::from_utf8_lossy(&surface.out).into_owned()
    }

    #[test]
    fn text_is_written_on_its_own_line() {
        let mut surface = Surface::new(Vec::new());
        let mut deck = MutedDeck::new(Duration::from_millis(10));
        assert!(surface.apply(Effect::ShowText("Incoming call..".to_string()), &mut deck));
        surface.flush().unwrap();
        let out = rendered(&surface);
        assert!(out.contains("Incoming call..\r\n"));
    }

    #[test]
    fn led_strip_redraws_only_on_change() {
        let mut surface = Surface::new(Vec::new());
        let mut deck = MutedDeck::new(Duration::from_millis(10));
        surface.apply(
            Effect::SetLed {
                person: PersonId(3),
                on: true,
            },
            &mut deck,
        );
        surface.flush().unwrap();
        assert!(surface.leds()[3]);
        let first = rendered(&surface);
        assert_eq!(first.matches("LEDs").count(), 1);
        assert!(first.contains('●'));

        surface.apply(
            Effect::SetLed {
                person: PersonId(3),
                on: true,
            },
            &mut deck,
        );
        surface.flush().unwrap();
        assert_eq!(rendered(&surface).matches("LEDs").count(), 1);
    }

    #[test]
    fn play_reaches_the_deck_and_shutdown_stops() {
        let mut surface = Surface::new(Vec::new());
        let mut deck = MutedDeck::new(Duration::ZERO);
        surface.apply(
            Effect::Play {
                channel: AudioChannel::Tone,
                media: "outgoing-ring".to_string(),
                token: TrackToken(9),
            },
            &mut deck,
        );
        assert_eq!(
            deck.poll_finished(Instant::now() + Duration::from_millis(1)),
            vec![(AudioChannel::Tone, TrackToken(9))]
        );
        assert!(!surface.apply(Effect::Shutdown, &mut deck));
    }
}
