//! One-shot timer queue polled by the event loop.
//!
//! Every timer carries its own payload, so a callback never reads a parameter that a
//! later event could have overwritten. Handles stay unique for the life of the
//! scheduler; cancelling a fired or unknown handle is a no-op.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Longest delay honoured; longer requests are clamped so the deadline cannot overflow.
pub const MAX_DELAY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Cancel handle returned by [`TimerScheduler::after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct TimerScheduler<T> {
    queue: BTreeMap<(Instant, TimerId), T>,
    deadlines: HashMap<TimerId, Instant>,
    next_id: u64,
}

impl<T> Default for TimerScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerScheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    /// Arm a one-shot timer that fires `delay` after `now`.
    pub fn after(&mut self, now: Instant, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = now + delay.min(MAX_DELAY);
        self.queue.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Drop a pending timer. Returns false when it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest timer whose deadline is at or before `now`.
    /// Timers with equal deadlines fire in the order they were armed.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, T)> {
        let key = *self.queue.keys().next()?;
        if key.0 > now {
            return None;
        }
        let payload = self.queue.remove(&key)?;
        self.deadlines.remove(&key.1);
        Some((key.1, payload))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }

    /// Time left until the next deadline, clamped at zero.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
