//! Coalescing debounce with an injectable clock.
//!
//! Rapid pushes collapse into one delivery once the delay elapses with no
//! further pushes. The clock is a trait so tests drive virtual time instead
//! of sleeping.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced time for deterministic tests.
pub struct VirtualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    /// Queue a value, replacing any pending one and restarting the delay.
    pub fn push(&mut self, value: T, clock: &dyn Clock) {
        self.pending = Some(value);
        self.deadline = Some(clock.now() + self.delay);
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, clock: &dyn Clock) -> Option<T> {
        let deadline = self.deadline?;
        if clock.now() < deadline {
            return None;
        }
        self.deadline = None;
        self.pending.take()
    }

    /// Deliver immediately, deadline or not.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_after_delay() {
        let clock = VirtualClock::new();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        debouncer.push(1, &clock);
        assert_eq!(debouncer.poll(&clock), None);

        clock.advance(Duration::from_millis(9));
        assert_eq!(debouncer.poll(&clock), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(debouncer.poll(&clock), Some(1));
        assert_eq!(debouncer.poll(&clock), None);
    }

    #[test]
    fn rapid_pushes_coalesce_into_latest() {
        let clock = VirtualClock::new();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        debouncer.push(1, &clock);
        clock.advance(Duration::from_millis(5));
        debouncer.push(2, &clock);
        clock.advance(Duration::from_millis(5));
        debouncer.push(3, &clock);

        // Each push restarted the window; nothing due yet.
        assert_eq!(debouncer.poll(&clock), None);

        clock.advance(Duration::from_millis(10));
        assert_eq!(debouncer.poll(&clock), Some(3));
    }

    #[test]
    fn flush_short_circuits_the_delay() {
        let clock = VirtualClock::new();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.push(7, &clock);
        assert_eq!(debouncer.flush(), Some(7));
        assert!(!debouncer.is_pending());
        clock.advance(Duration::from_millis(20));
        assert_eq!(debouncer.poll(&clock), None);
    }

    #[test]
    fn empty_debouncer_polls_none() {
        let clock = VirtualClock::new();
        let mut debouncer: Debouncer<u32> = Debouncer::new(Duration::from_millis(10));
        assert_eq!(debouncer.poll(&clock), None);
        assert!(!debouncer.is_pending());
    }
}
