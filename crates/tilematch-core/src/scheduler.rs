//! Logical-time timer queue.
//!
//! Every timed suspension in the game (flip animations, the flip-back delay,
//! the pair-check cooldown, the level entry sequence) is a timer here. Time
//! only moves when the owner advances it, so tests run at any speed and are
//! fully deterministic.
//!
//! Timers with equal deadlines fire in scheduling order.

use std::collections::BTreeMap;

use crate::id::TimerId;
use crate::time::Seconds;

/// A timer queue carrying payloads of type `T`.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Seconds,
    next_seq: u64,
    /// Keyed by `(deadline, sequence)`.
    timers: BTreeMap<(Seconds, u64), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// A scheduler starting at time zero.
    pub fn new() -> Self {
        Self {
            now: Seconds::ZERO,
            next_seq: 0,
            timers: BTreeMap::new(),
        }
    }

    /// Current logical time.
    pub fn now(&self) -> Seconds {
        self.now
    }

    /// Schedule `payload` to fire `delay` after the current time. Negative
    /// delays are treated as zero.
    pub fn schedule(&mut self, delay: Seconds, payload: T) -> TimerId {
        let delay = delay.max(Seconds::ZERO);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert((self.now.saturating_add(delay), seq), payload);
        TimerId(seq)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Seconds> {
        self.timers.keys().next().map(|&(due, _)| due)
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Seconds) -> Option<(Seconds, T)> {
        let &(due, seq) = self.timers.keys().next()?;
        if due > until {
            return None;
        }
        let payload = self.timers.remove(&(due, seq))?;
        if due > self.now {
            self.now = due;
        }
        Some((due, payload))
    }

    /// Move the clock forward to `time`. Never moves backwards.
    pub fn advance_to(&mut self, time: Seconds) {
        if time > self.now {
            self.now = time;
        }
    }

    /// Drop every pending timer. The clock is kept.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
