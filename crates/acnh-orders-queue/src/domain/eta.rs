//! Wait-time estimate for a queue position.

use std::time::Duration;

/// Estimates how long a requester at a given position will wait.
///
/// Position 1 pays the full `arrive + setup + user_allowed + wait_for_arriver`
/// cost. Every order ahead adds the same cost minus `setup`, which is only
/// paid once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtaEstimator {
    arrive: Duration,
    setup: Duration,
    user_allowed: Duration,
    wait_for_arriver: Duration,
}

impl EtaEstimator {
    /// Creates an estimator from the four phase durations.
    #[must_use]
    pub const fn new(
        arrive: Duration,
        setup: Duration,
        user_allowed: Duration,
        wait_for_arriver: Duration,
    ) -> Self {
        Self {
            arrive,
            setup,
            user_allowed,
            wait_for_arriver,
        }
    }

    /// Time needed to clear position 1.
    #[must_use]
    pub fn base(&self) -> Duration {
        self.increment().saturating_add(self.setup)
    }

    /// Extra time for each additional order ahead.
    #[must_use]
    pub fn increment(&self) -> Duration {
        self.arrive
            .saturating_add(self.user_allowed)
            .saturating_add(self.wait_for_arriver)
    }

    /// Estimated wait for a 1-based `position`.
    ///
    /// Strictly increasing in `position` as long as `increment()` is
    /// non-zero. Callers must not pass 0.
    #[must_use]
    pub fn estimate(&self, position: usize) -> Duration {
        debug_assert!(position >= 1, "queue positions are 1-based");
        let ahead = u32::try_from(position.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base()
            .saturating_add(self.increment().saturating_mul(ahead))
    }

    /// Estimated wait for `position`, formatted with [`format_eta`].
    #[must_use]
    pub fn estimate_text(&self, position: usize) -> String {
        format_eta(self.estimate(position))
    }
}

/// Renders a duration as `"HHh:MMm:SSs"`, or `"MMm:SSs"` when under an hour.
///
/// Hours are not wrapped into days: a wait of one day, two minutes and
/// 35 seconds renders as `"24h:02m:35s"`. The legacy bot printed only the
/// hour-of-day component and showed `"02m:35s"` for the same wait; that
/// behavior is intentionally not reproduced.
#[must_use]
pub fn format_eta(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours:02}h:{minutes:02}m:{seconds:02}s")
    } else {
        format!("{minutes:02}m:{seconds:02}s")
    }
}
