//! Queue timing and display settings.

use std::time::Duration;

use chrono::TimeDelta;
use serde::Deserialize;

use crate::domain::eta::EtaEstimator;

/// Settings the queue reads at startup.
///
/// Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Seconds for the requester to fly in.
    pub arrive_time: u64,
    /// Seconds to prepare the island before each session.
    pub setup_time: u64,
    /// Seconds a requester may stay on the island.
    pub user_time_allowed: u64,
    /// Seconds to wait for the requester to show up.
    pub wait_for_arriver_time: u64,
    /// Show numeric order ids to requesters.
    pub show_ids: bool,
    /// Seconds after which a skipped requester may queue again. Unset means
    /// the block only ends when the entry is removed.
    pub skip_cooldown_seconds: Option<u64>,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            arrive_time: 90,
            setup_time: 95,
            user_time_allowed: 180,
            wait_for_arriver_time: 60,
            show_ids: false,
            skip_cooldown_seconds: None,
        }
    }
}

impl OrderConfig {
    /// Builds the wait-time estimator from these settings.
    #[must_use]
    pub fn eta_estimator(&self) -> EtaEstimator {
        EtaEstimator::new(
            Duration::from_secs(self.arrive_time),
            Duration::from_secs(self.setup_time),
            Duration::from_secs(self.user_time_allowed),
            Duration::from_secs(self.wait_for_arriver_time),
        )
    }

    /// The skip cooldown, if one is configured. A value too large to
    /// represent never expires.
    #[must_use]
    pub fn skip_cooldown(&self) -> Option<TimeDelta> {
        self.skip_cooldown_seconds
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(TimeDelta::try_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults_for_missing_fields() {
        // Arrange
        let yaml = "user_time_allowed: 300\nshow_ids: true\n";

        // Act
        let config: OrderConfig = serde_yaml::from_str(yaml).unwrap();

        // Assert
        assert_eq!(config.user_time_allowed, 300);
        assert!(config.show_ids);
        assert_eq!(config.arrive_time, 90);
        assert_eq!(config.setup_time, 95);
        assert!(config.skip_cooldown().is_none());
    }

    #[test]
    fn test_eta_estimator_uses_configured_durations() {
        let eta = OrderConfig::default().eta_estimator();

        assert_eq!(eta.estimate(1), Duration::from_secs(425));
    }

    #[test]
    fn test_skip_cooldown_converts_seconds() {
        let config = OrderConfig {
            skip_cooldown_seconds: Some(600),
            ..OrderConfig::default()
        };

        assert_eq!(config.skip_cooldown(), Some(TimeDelta::minutes(10)));
    }

    #[test]
    fn test_skip_cooldown_out_of_range_is_unset() {
        for secs in [u64::MAX / 2, u64::MAX] {
            let config = OrderConfig {
                skip_cooldown_seconds: Some(secs),
                ..OrderConfig::default()
            };

            assert!(config.skip_cooldown().is_none());
        }
    }
}
