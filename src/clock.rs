//! Time sources for debounce decisions and event timestamps.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of timestamps, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall-clock seconds since the UNIX epoch.
///
/// Wall-clock time matches the timestamps stored in recordings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// A clock that only moves when told to. Used for replaying logged frames.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1.5);
        assert_eq!(clock.now(), 1.5);

        clock.advance(0.25);
        assert_eq!(clock.now(), 1.75);

        clock.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn test_system_clock_is_wall_clock() {
        let now = SystemClock.now();
        // Some time after 2020-01-01.
        assert!(now > 1_577_836_800.0);
    }

    #[test]
    fn test_shared_clock_handles() {
        let clock = std::rc::Rc::new(ManualClock::new(0.0));
        let handle = clock.clone();

        clock.advance(2.0);
        assert_eq!(handle.now(), 2.0);
        assert_eq!((&*clock).now(), 2.0);
    }
}
