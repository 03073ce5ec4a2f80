//! Clock abstraction so queue timing can be pinned in tests.

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time for order timestamps and cooldowns.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns `true` once `window` has passed since `since`.
    fn has_elapsed(&self, since: DateTime<Utc>, window: TimeDelta) -> bool {
        self.now() - since >= window
    }
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct At(DateTime<Utc>);

    impl Clock for At {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_has_elapsed_is_inclusive_of_window_boundary() {
        // Arrange
        let since = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let clock = At(since + TimeDelta::seconds(30));

        // Act / Assert
        assert!(clock.has_elapsed(since, TimeDelta::seconds(30)));
        assert!(!clock.has_elapsed(since, TimeDelta::seconds(31)));
    }
}
