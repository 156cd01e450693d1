//! Owns the core pieces and feeds them one event at a time.
//!
//! The event loop calls [`Exhibit::dispatch`] for every message from the panel and
//! audio threads and [`Exhibit::fire_due`] whenever the earliest timer is reached.
//! Nothing here blocks.

use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use crate::config::DebounceTimings;
use crate::events::{
    AudioEvent, Effect, Io, LoopEvent, PanelEvent, PersonId, PlugEvent, Timer, JACK_COUNT,
    START_BUTTON_LINE,
};
use crate::jack::{JackBank, JackDebouncer};
use crate::log_debug;
use crate::panel::SenseLines;
use crate::session::CallSessionMachine;
use crate::timer::TimerScheduler;

pub const BOOT_TEXT: &str = "Press the Start button to begin!";
pub const REMOVE_PLUGS_TEXT: &str = "Remove phone plugs and press Start again";

pub struct Exhibit<L: SenseLines> {
    lines: L,
    jacks: JackBank,
    debouncer: JackDebouncer,
    session: CallSessionMachine,
    timers: TimerScheduler<Timer>,
    effects: Sender<Effect>,
}

impl<L: SenseLines> Exhibit<L> {
    pub fn new(
        lines: L,
        debounce: DebounceTimings,
        session: CallSessionMachine,
        effects: Sender<Effect>,
    ) -> Self {
        Self {
            lines,
            jacks: JackBank::new(),
            debouncer: JackDebouncer::new(debounce),
            session,
            timers: TimerScheduler::new(),
            effects,
        }
    }

    pub fn session(&self) -> &CallSessionMachine {
        &self.session
    }

    pub fn jacks(&self) -> &JackBank {
        &self.jacks
    }

    pub fn debouncer(&self) -> &JackDebouncer {
        &self.debouncer
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    /// Dark panel and the invitation to press Start.
    pub fn boot(&mut self) {
        self.all_leds_off();
        let _ = self.effects.send(Effect::ShowText(BOOT_TEXT.to_string()));
    }

    /// Handle one message. Returns false once the loop should exit.
    pub fn dispatch(&mut self, event: LoopEvent, now: Instant) -> bool {
        match event {
            LoopEvent::Panel(PanelEvent::Edge(line)) => self.on_edge(line, now),
            LoopEvent::Audio(AudioEvent::EndOfTrack { channel, token }) => {
                let mut io = Io {
                    now,
                    timers: &mut self.timers,
                    effects: &self.effects,
                };
                self.session.on_end_of_track(channel, token, &mut io);
            }
            LoopEvent::Quit => return false,
        }
        true
    }

    /// Run every timer whose deadline is at or before `now`, earliest first.
    pub fn fire_due(&mut self, now: Instant) {
        while let Some((_, timer)) = self.timers.pop_due(now) {
            match timer {
                Timer::Confirm(jack) => {
                    let event = self.debouncer.on_confirm(
                        jack,
                        &self.lines,
                        &self.jacks,
                        now,
                        &mut self.timers,
                    );
                    if let Some(event) = event {
                        self.on_plug_event(event, now);
                    }
                }
                Timer::Settle(jack) => self.debouncer.on_settle(jack),
                Timer::Wiggle(jack) => {
                    self.debouncer
                        .on_wiggle_check(jack, &self.lines, now, &mut self.timers)
                }
                session_timer => {
                    let mut io = Io {
                        now,
                        timers: &mut self.timers,
                        effects: &self.effects,
                    };
                    self.session.on_timer(session_timer, &mut io);
                }
            }
        }
    }

    /// Silence everything and tell the surface to close.
    pub fn shutdown(&mut self, now: Instant) {
        let mut io = Io {
            now,
            timers: &mut self.timers,
            effects: &self.effects,
        };
        self.session.halt(&mut io);
        self.timers.clear();
        self.all_leds_off();
        let _ = self.effects.send(Effect::Shutdown);
    }

    fn on_edge(&mut self, line: u8, now: Instant) {
        if line == START_BUTTON_LINE {
            if self.lines.is_grounded(line) {
                self.on_start_pressed(now);
            }
            return;
        }
        match PersonId::from_line(line) {
            Some(jack) => self
                .debouncer
                .on_raw_edge(jack, &self.jacks, now, &mut self.timers),
            None => log_debug(&format!("edge on unused button line {line}")),
        }
    }

    fn on_start_pressed(&mut self, now: Instant) {
        log_debug("start pressed");
        self.debouncer.hold_for_restart(&mut self.timers);
        {
            let mut io = Io {
                now,
                timers: &mut self.timers,
                effects: &self.effects,
            };
            self.session.halt(&mut io);
        }

        if self.lines.any_grounded(0..JACK_COUNT as u8) {
            log_debug("start refused; jacks still plugged");
            let _ = self
                .effects
                .send(Effect::ShowText(REMOVE_PLUGS_TEXT.to_string()));
            return;
        }

        self.debouncer.reset(&mut self.timers);
        self.jacks.reset();
        self.all_leds_off();
        let mut io = Io {
            now,
            timers: &mut self.timers,
            effects: &self.effects,
        };
        self.session.handle_start(&mut io);
    }

    fn on_plug_event(&mut self, event: PlugEvent, now: Instant) {
        tracing::info!(?event, "plug event");
        let mut io = Io {
            now,
            timers: &mut self.timers,
            effects: &self.effects,
        };
        match event {
            PlugEvent::PlugIn(jack) => self.session.handle_plug_in(jack, &mut io, &mut self.jacks),
            PlugEvent::Unplug(jack) => self.session.handle_unplug(jack, &mut io, &mut self.jacks),
        }
    }

    fn all_leds_off(&self) {
        for slot in 0..JACK_COUNT as u8 {
            let _ = self.effects.send(Effect::SetLed {
                person: PersonId(slot),
                on: false,
            });
        }
    }
}
