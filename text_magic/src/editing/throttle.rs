// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::{Duration, Instant};

/// Leading-edge rate limiter for repeated calls.
///
/// The first call in each interval goes through at once. Calls inside the interval are
/// held as pending with only the freshest value kept, so [`Throttle::flush`] can deliver
/// the final value when the burst ends. Timestamps are supplied by the caller.
#[derive(Clone, Debug)]
pub struct Throttle<T> {
    interval: Duration,
    last_execution: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    /// Creates a throttle that lets one call through per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_execution: None,
            pending: None,
        }
    }

    /// The minimum time between two calls going through.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offers `value` at time `now`.
    ///
    /// Returns the value if it should be acted on now; otherwise keeps it as pending.
    pub fn call(&mut self, now: Instant, value: T) -> Option<T> {
        let ready = self
            .last_execution
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if ready {
            self.last_execution = Some(now);
            self.pending = None;
            Some(value)
        } else {
            log::trace!("throttled call held as pending");
            self.pending = Some(value);
            None
        }
    }

    /// Delivers the pending value once the interval has elapsed since the last call.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .last_execution
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due && self.pending.is_some() {
            self.last_execution = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Takes the pending value regardless of timing.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Returns `true` if a value is being held.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forgets the pending value and the last call time.
    pub fn reset(&mut self) {
        self.last_execution = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::Throttle;
    use std::time::{Duration, Instant};

    #[test]
    fn leading_call_goes_through() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(100));
        assert_eq!(throttle.call(start, 1), Some(1));
        assert_eq!(throttle.call(start + Duration::from_millis(10), 2), None);
        assert_eq!(throttle.call(start + Duration::from_millis(20), 3), None);
        assert!(throttle.has_pending());
        assert_eq!(throttle.call(start + Duration::from_millis(100), 4), Some(4));
        assert!(!throttle.has_pending(), "a delivered call drops stale pending values");
    }

    #[test]
    fn flush_delivers_freshest_value() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(100));
        throttle.call(start, (0.0, 0.0));
        throttle.call(start + Duration::from_millis(5), (1.0, 1.0));
        throttle.call(start + Duration::from_millis(6), (2.0, 2.0));
        assert_eq!(throttle.flush(), Some((2.0, 2.0)));
        assert_eq!(throttle.flush(), None);
    }

    #[test]
    fn poll_waits_for_interval() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(100));
        throttle.call(start, 'a');
        throttle.call(start + Duration::from_millis(30), 'b');
        assert_eq!(throttle.poll(start + Duration::from_millis(50)), None);
        assert_eq!(throttle.poll(start + Duration::from_millis(120)), Some('b'));
        assert_eq!(throttle.poll(start + Duration::from_millis(500)), None);
    }
}
