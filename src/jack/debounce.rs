//! Raw-edge filtering for the twelve jack sense lines.
//!
//! A fresh edge arms a confirmation timer; the line is re-read once when it fires and
//! at most one [`PlugEvent`] comes out. A short settle delay follows before the jack
//! accepts new edges. Edges on a jack that is already plugged in go through a shorter
//! wiggle check first, so a jostled cord does not read as an unplug.

use std::time::Instant;

use crate::config::DebounceTimings;
use crate::events::{PersonId, PlugEvent, Timer, JACK_COUNT};
use crate::log_debug;
use crate::panel::SenseLines;
use crate::timer::{TimerId, TimerScheduler};

use super::JackBank;

#[derive(Debug, Default, Clone, Copy)]
struct LineCheck {
    /// Set from the first edge until the settle delay ends.
    in_flight: bool,
    confirm: Option<TimerId>,
    settle: Option<TimerId>,
    wiggle: Option<TimerId>,
    /// Edges seen while a check was already running, for the log.
    absorbed_edges: u32,
}

#[derive(Debug)]
pub struct JackDebouncer {
    timings: DebounceTimings,
    checks: [LineCheck; JACK_COUNT],
    awaiting_restart: bool,
}

impl JackDebouncer {
    pub fn new(timings: DebounceTimings) -> Self {
        Self {
            timings,
            checks: [LineCheck::default(); JACK_COUNT],
            awaiting_restart: false,
        }
    }

    pub fn awaiting_restart(&self) -> bool {
        self.awaiting_restart
    }

    /// Start pressed: abandon every check in progress and treat further activity as
    /// noise until [`JackDebouncer::reset`].
    pub fn hold_for_restart(&mut self, timers: &mut TimerScheduler<Timer>) {
        for check in &mut self.checks {
            disarm(check, timers);
        }
        self.awaiting_restart = true;
    }

    pub fn is_checking(&self, jack: PersonId) -> bool {
        self.check(jack).is_some_and(|check| check.in_flight)
    }

    pub fn is_wiggle_pending(&self, jack: PersonId) -> bool {
        self.check(jack).is_some_and(|check| check.wiggle.is_some())
    }

    /// Interrupt-path entry point. Never emits an event directly; only arms timers.
    pub fn on_raw_edge(
        &mut self,
        jack: PersonId,
        jacks: &JackBank,
        now: Instant,
        timers: &mut TimerScheduler<Timer>,
    ) {
        let timings = self.timings;
        let awaiting_restart = self.awaiting_restart;
        let Some(check) = self.checks.get_mut(jack.slot()) else {
            log_debug(&format!("edge on non-jack line {}; ignoring", jack.line()));
            return;
        };

        if awaiting_restart {
            log_debug(&format!("jack {jack}: activity while awaiting restart"));
            disarm(check, timers);
            return;
        }

        if check.in_flight {
            check.absorbed_edges += 1;
            return;
        }

        if jacks.is_plugged_in(jack) {
            // Restarting the wiggle timer keeps pushing the re-check past the noise.
            if let Some(id) = check.wiggle.take() {
                timers.cancel(id);
            }
            check.wiggle = Some(timers.after(now, timings.wiggle, Timer::Wiggle(jack)));
            tracing::debug!(jack = jack.line(), "wiggle check armed");
            return;
        }

        check.in_flight = true;
        check.confirm = Some(timers.after(now, timings.confirm, Timer::Confirm(jack)));
        tracing::debug!(jack = jack.line(), "confirmation armed");
    }

    /// Wiggle timer expiry: a still-grounded jack was only jostled.
    pub fn on_wiggle_check(
        &mut self,
        jack: PersonId,
        lines: &dyn SenseLines,
        now: Instant,
        timers: &mut TimerScheduler<Timer>,
    ) {
        let confirm_delay = self.timings.confirm;
        let awaiting_restart = self.awaiting_restart;
        let Some(check) = self.checks.get_mut(jack.slot()) else {
            return;
        };
        check.wiggle = None;
        if awaiting_restart {
            return;
        }
        if lines.is_grounded(jack.line()) {
            log_debug(&format!("jack {jack}: wiggle only, still grounded"));
            return;
        }
        if check.in_flight {
            return;
        }
        log_debug(&format!("jack {jack}: open after wiggle delay, confirming unplug"));
        check.in_flight = true;
        check.confirm = Some(timers.after(now, confirm_delay, Timer::Confirm(jack)));
    }

    /// Confirmation timer expiry: read the settled level once and decide.
    pub fn on_confirm(
        &mut self,
        jack: PersonId,
        lines: &dyn SenseLines,
        jacks: &JackBank,
        now: Instant,
        timers: &mut TimerScheduler<Timer>,
    ) -> Option<PlugEvent> {
        let settle_delay = self.timings.settle;
        let awaiting_restart = self.awaiting_restart;
        let check = self.checks.get_mut(jack.slot())?;
        check.confirm = None;
        if awaiting_restart {
            log_debug(&format!("jack {jack}: confirmation while awaiting restart; dropping"));
            disarm(check, timers);
            return None;
        }
        let absorbed = std::mem::take(&mut check.absorbed_edges);

        let event = if lines.is_grounded(jack.line()) {
            Some(PlugEvent::PlugIn(jack))
        } else if jacks.is_plugged_in(jack) {
            Some(PlugEvent::Unplug(jack))
        } else {
            log_debug(&format!(
                "jack {jack}: settled high but was not plugged in; dropping"
            ));
            None
        };
        tracing::debug!(jack = jack.line(), absorbed, ?event, "confirmation fired");

        check.settle = Some(timers.after(now, settle_delay, Timer::Settle(jack)));
        event
    }

    /// Settle delay expiry: the jack accepts new edges again.
    pub fn on_settle(&mut self, jack: PersonId) {
        if let Some(check) = self.checks.get_mut(jack.slot()) {
            check.settle = None;
            check.in_flight = false;
            check.absorbed_edges = 0;
        }
    }

    /// Drop every pending check and clear the restart flag.
    pub fn reset(&mut self, timers: &mut TimerScheduler<Timer>) {
        for check in &mut self.checks {
            disarm(check, timers);
        }
        self.awaiting_restart = false;
    }

    fn check(&self, jack: PersonId) -> Option<&LineCheck> {
        self.checks.get(jack.slot())
    }
}

fn disarm(check: &mut LineCheck, timers: &mut TimerScheduler<Timer>) {
    for id in [check.confirm.take(), check.settle.take(), check.wiggle.take()]
        .into_iter()
        .flatten()
    {
        timers.cancel(id);
    }
    *check = LineCheck::default();
}
