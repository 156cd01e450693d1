use std::time::Duration;

use crate::events::{Io, PersonId, Timer};
use crate::timer::TimerId;

/// Toggles the ringing caller's LED on a fixed interval.
#[derive(Debug)]
pub struct Blinker {
    interval: Duration,
    person: Option<PersonId>,
    lit: bool,
    timer: Option<TimerId>,
}

impl Blinker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            person: None,
            lit: false,
            timer: None,
        }
    }

    pub fn blinking(&self) -> Option<PersonId> {
        self.person
    }

    pub fn start(&mut self, person: PersonId, io: &mut Io<'_>) {
        self.stop(io);
        self.person = Some(person);
        self.lit = false;
        self.timer = Some(io.timers.after(io.now, self.interval, Timer::Blink));
    }

    /// Stop toggling; the LED keeps whatever state it was last set to.
    pub fn stop(&mut self, io: &mut Io<'_>) {
        if let Some(id) = self.timer.take() {
            io.timers.cancel(id);
        }
        self.person = None;
    }

    pub fn on_tick(&mut self, io: &mut Io<'_>) {
        self.timer = None;
        let Some(person) = self.person else {
            return;
        };
        self.lit = !self.lit;
        io.set_led(person, self.lit);
        self.timer = Some(io.timers.after(io.now, self.interval, Timer::Blink));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Effect;
    use crate::timer::TimerScheduler;
    use crossbeam_channel::unbounded;
    use std::time::Instant;

    #[test]
    fn toggles_until_stopped() {
        let (tx, rx) = unbounded();
        let mut timers = TimerScheduler::new();
        let start = Instant::now();
        let mut blinker = Blinker::new(Duration::from_millis(600));
        blinker.start(
            PersonId(3),
            &mut Io {
                now: start,
                timers: &mut timers,
                effects: &tx,
            },
        );
        for tick in 1..=3u32 {
            let now = start + Duration::from_millis(600) * tick;
            let (_, timer) = timers.pop_due(now).expect("blink due");
            assert_eq!(timer, Timer::Blink);
            blinker.on_tick(&mut Io {
                now,
                timers: &mut timers,
                effects: &tx,
            });
        }
        let leds: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            leds,
            vec![
                Effect::SetLed { person: PersonId(3), on: true },
                Effect::SetLed { person: PersonId(3), on: false },
                Effect::SetLed { person: PersonId(3), on: true },
            ]
        );

        blinker.stop(&mut Io {
            now: start,
            timers: &mut timers,
            effects: &tx,
        });
        assert!(timers.is_empty());
        assert_eq!(blinker.blinking(), None);
    }
}
