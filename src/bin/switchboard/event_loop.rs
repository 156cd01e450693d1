//! Core runtime loop: wait for the next message or the next timer, whichever comes first.

use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver};
use switchboard::events::LoopEvent;
use switchboard::exhibit::Exhibit;
use switchboard::log_debug;
use switchboard::panel::SenseLines;

const EVENT_LOOP_IDLE_MS: u64 = 250;

pub(crate) fn run_event_loop<L: SenseLines>(
    exhibit: &mut Exhibit<L>,
    events: &Receiver<LoopEvent>,
) {
    let idle = Duration::from_millis(EVENT_LOOP_IDLE_MS);
    loop {
        exhibit.fire_due(Instant::now());
        let wait = exhibit
            .time_until_next(Instant::now())
            .map_or(idle, |left| left.min(idle));
        select! {
            recv(events) -> event => match event {
                Ok(event) => {
                    if !exhibit.dispatch(event, Instant::now()) {
                        log_debug("quit requested");
                        break;
                    }
                }
                Err(_) => {
                    log_debug("event channel closed");
                    break;
                }
            },
            default(wait) => {}
        }
    }
}
