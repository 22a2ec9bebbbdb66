//! Refresh configuration supplied by the host at start.

use crate::error::ConfigError;
use std::time::Duration;

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// How often to refresh and which category to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between cycle starts
    pub refresh_interval: Duration,
    /// Category a contact must carry to be published; blank means any
    pub match_category: String,
}

impl RefreshConfig {
    pub fn new(refresh_interval: Duration, match_category: impl Into<String>) -> Self {
        Self {
            refresh_interval,
            match_category: match_category.into(),
        }
    }

    /// Interval expressed in whole hours, the unit hosts configure.
    pub fn from_hours(hours: u64, match_category: impl Into<String>) -> Self {
        Self::new(
            Duration::from_secs(hours.saturating_mul(SECONDS_PER_HOUR)),
            match_category,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hours() {
        let config = RefreshConfig::from_hours(6, "Family");
        assert_eq!(config.refresh_interval, Duration::from_secs(6 * 3600));
        assert_eq!(config.match_category, "Family");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert_eq!(
            RefreshConfig::from_hours(0, "").validate(),
            Err(ConfigError::ZeroInterval)
        );
        assert_eq!(
            RefreshConfig::new(Duration::ZERO, "").validate(),
            Err(ConfigError::ZeroInterval)
        );
    }
}
