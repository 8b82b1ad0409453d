//! Time sources for stamping sales
//!
//! Round pacing does not go through these: the [`Scheduler`](crate::Scheduler)
//! runs on tokio time so paused-clock tests drive it directly.

use chrono::{Duration, Utc};
use gavel_core::Timestamp;
use gavel_ports::Clock;
use parking_lot::RwLock;

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

/// Clock frozen at a given instant until explicitly moved
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(at: Timestamp) -> Self {
        Self {
            now: RwLock::new(at),
        }
    }

    pub fn set(&self, at: Timestamp) {
        *self.now.write() = at;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }
}

impl Default for FixedClock {
    /// Frozen at the Unix epoch
    fn default() -> Self {
        Self::new(Timestamp::default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }

    fn name(&self) -> &str {
        "FixedClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), start + Duration::seconds(30));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_default_fixed_clock_is_epoch() {
        assert_eq!(FixedClock::default().now().timestamp(), 0);
    }

    #[test]
    fn test_system_clock_is_not_frozen() {
        let before = Utc::now();
        let now = SystemClock::new().now();
        assert!(now >= before);
        assert_eq!(SystemClock.name(), "SystemClock");
    }
}
