use std::time::{Duration, Instant};

use super::{JackBank, JackDebouncer};
use crate::config::DebounceTimings;
use crate::events::{PersonId, PlugEvent, Timer};
use crate::panel::SenseLines;
use crate::timer::TimerScheduler;

#[derive(Default)]
struct FakeLines {
    grounded: [bool; 16],
}

impl SenseLines for FakeLines {
    fn is_grounded(&self, line: u8) -> bool {
        self.grounded[usize::from(line)]
    }
}

struct Harness {
    debouncer: JackDebouncer,
    jacks: JackBank,
    timers: TimerScheduler<Timer>,
    lines: FakeLines,
    start: Instant,
    now: Instant,
    events: Vec<PlugEvent>,
}

impl Harness {
    fn new() -> Self {
        let start = Instant::now();
        Self {
            debouncer: JackDebouncer::new(DebounceTimings::default()),
            jacks: JackBank::new(),
            timers: TimerScheduler::new(),
            lines: FakeLines::default(),
            start,
            now: start,
            events: Vec::new(),
        }
    }

    fn at(&mut self, ms: u64) {
        let target = self.start + Duration::from_millis(ms);
        while let Some(deadline) = self.timers.next_deadline() {
            if deadline > target {
                break;
            }
            self.now = deadline;
            let Some((_, timer)) = self.timers.pop_due(deadline) else {
                break;
            };
            self.fire(timer);
        }
        self.now = target;
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::Confirm(jack) => {
                if let Some(event) = self.debouncer.on_confirm(
                    jack,
                    &self.lines,
                    &self.jacks,
                    self.now,
                    &mut self.timers,
                ) {
                    // Stand-in for the session accepting every plug.
                    match event {
                        PlugEvent::PlugIn(jack) => self.jacks.set_plugged_in(jack, true),
                        PlugEvent::Unplug(jack) => self.jacks.set_plugged_in(jack, false),
                    }
                    self.events.push(event);
                }
            }
            Timer::Settle(jack) => self.debouncer.on_settle(jack),
            Timer::Wiggle(jack) => {
                self.debouncer
                    .on_wiggle_check(jack, &self.lines, self.now, &mut self.timers)
            }
            other => panic!("unexpected timer {other:?}"),
        }
    }

    fn edge(&mut self, line: u8, grounded: bool) {
        self.lines.grounded[usize::from(line)] = grounded;
        self.debouncer
            .on_raw_edge(PersonId(line), &self.jacks, self.now, &mut self.timers);
    }
}

#[test]
fn clean_insertion_emits_one_plug_in_after_confirm_delay() {
    let mut h = Harness::new();
    h.edge(3, true);
    assert!(h.debouncer.is_checking(PersonId(3)));
    h.at(299);
    assert!(h.events.is_empty());
    h.at(300);
    assert_eq!(h.events, vec![PlugEvent::PlugIn(PersonId(3))]);
    assert!(h.debouncer.is_checking(PersonId(3)));
    h.at(450);
    assert!(!h.debouncer.is_checking(PersonId(3)));
}

#[test]
fn bouncing_edges_within_confirm_window_emit_at_most_one_event() {
    let mut h = Harness::new();
    for (step, ms) in [0u64, 10, 25, 40, 90, 200, 290].into_iter().enumerate() {
        h.at(ms);
        h.edge(7, step % 2 == 0);
    }
    // Chatter ended grounded.
    h.at(1_000);
    assert_eq!(h.events, vec![PlugEvent::PlugIn(PersonId(7))]);
}

#[test]
fn edges_during_settle_delay_are_absorbed() {
    let mut h = Harness::new();
    h.edge(2, true);
    h.at(300);
    h.at(350);
    h.edge(2, true);
    h.at(1_000);
    assert_eq!(h.events.len(), 1);
}

#[test]
fn removal_of_plugged_jack_goes_through_wiggle_then_confirm() {
    let mut h = Harness::new();
    h.edge(4, true);
    h.at(500);
    h.events.clear();

    h.edge(4, false);
    assert!(h.debouncer.is_wiggle_pending(PersonId(4)));
    assert!(!h.debouncer.is_checking(PersonId(4)));
    h.at(580);
    assert!(h.debouncer.is_checking(PersonId(4)));
    h.at(879);
    assert!(h.events.is_empty());
    h.at(880);
    assert_eq!(h.events, vec![PlugEvent::Unplug(PersonId(4))]);
    assert!(!h.jacks.is_plugged_in(PersonId(4)));
}

#[test]
fn wiggle_that_recovers_within_delay_is_noise() {
    let mut h = Harness::new();
    h.edge(9, true);
    h.at(500);
    h.events.clear();

    h.edge(9, false);
    h.at(530);
    h.edge(9, true);
    h.at(2_000);
    assert!(h.events.is_empty());
    assert!(h.jacks.is_plugged_in(PersonId(9)));
    assert!(!h.debouncer.is_checking(PersonId(9)));
}

#[test]
fn open_edge_on_unplugged_jack_is_dropped() {
    let mut h = Harness::new();
    h.edge(1, false);
    h.at(1_000);
    assert!(h.events.is_empty());
    assert!(!h.debouncer.is_checking(PersonId(1)));
}

#[test]
fn jacks_are_debounced_independently() {
    let mut h = Harness::new();
    h.edge(0, true);
    h.at(100);
    h.edge(11, true);
    h.at(1_000);
    assert_eq!(
        h.events,
        vec![
            PlugEvent::PlugIn(PersonId(0)),
            PlugEvent::PlugIn(PersonId(11))
        ]
    );
}

#[test]
fn edges_while_awaiting_restart_cancel_in_flight_check() {
    let mut h = Harness::new();
    h.edge(6, true);
    h.debouncer.hold_for_restart(&mut h.timers);
    h.at(100);
    h.edge(6, false);
    assert!(!h.debouncer.is_checking(PersonId(6)));
    h.at(1_000);
    assert!(h.events.is_empty());
    assert!(h.timers.is_empty());
}

#[test]
fn hold_for_restart_cancels_wiggle_and_confirm_checks() {
    let mut h = Harness::new();
    h.edge(4, true);
    h.at(500);
    h.events.clear();

    h.edge(4, false);
    h.edge(8, true);
    assert!(h.debouncer.is_wiggle_pending(PersonId(4)));
    assert!(h.debouncer.is_checking(PersonId(8)));
    h.debouncer.hold_for_restart(&mut h.timers);
    assert!(h.debouncer.awaiting_restart());
    assert!(!h.debouncer.is_wiggle_pending(PersonId(4)));
    assert!(!h.debouncer.is_checking(PersonId(8)));
    assert!(h.timers.is_empty());
    h.at(2_000);
    assert!(h.events.is_empty());
}

#[test]
fn confirmation_firing_while_awaiting_restart_emits_nothing() {
    let mut h = Harness::new();
    h.edge(2, true);
    h.at(100);
    // A confirm already popped from the queue still reaches the debouncer.
    h.debouncer.hold_for_restart(&mut h.timers);
    h.fire(Timer::Confirm(PersonId(2)));
    h.fire(Timer::Wiggle(PersonId(2)));
    assert!(h.events.is_empty());
    assert!(!h.debouncer.is_checking(PersonId(2)));
    assert!(h.timers.is_empty());
}

#[test]
fn reset_clears_pending_timers_and_restart_flag() {
    let mut h = Harness::new();
    h.edge(5, true);
    h.debouncer.hold_for_restart(&mut h.timers);
    h.debouncer.reset(&mut h.timers);
    assert!(!h.debouncer.awaiting_restart());
    assert!(!h.debouncer.is_checking(PersonId(5)));
    assert!(h.timers.is_empty());
}

#[test]
fn edge_on_button_line_is_ignored() {
    let mut h = Harness::new();
    h.edge(13, true);
    assert!(h.timers.is_empty());
}
