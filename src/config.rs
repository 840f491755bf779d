//! Configuration of a [`Calendar`](crate::chinese::Calendar).

use crate::error::{CalendarError, Result};

/// Offset of China Standard Time (UTC+8), in minutes.
pub const CHINA_STANDARD_TIME: i32 = 480;

/// Calendar configuration.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use nongli::CalendarConfig;
///
/// let config = CalendarConfig::new()
///     .with_utc_offset_minutes(540)
///     .with_cache_capacity(8);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(540, config.utc_offset_minutes());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CalendarConfig {
    /// Fixed offset east of UTC deciding civil days, in minutes.
    utc_offset_minutes: i32,
    /// Maximum number of years kept by each per-year cache.
    cache_capacity: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: CHINA_STANDARD_TIME,
            cache_capacity: 64,
        }
    }
}

impl CalendarConfig {
    /// Creates the default configuration: UTC+8, 64 cached years.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fixed UTC offset, in minutes east of UTC.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Sets how many years each per-year cache keeps.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Validates all parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidConfig`] if the offset lies outside
    /// UTC−12:00..=UTC+14:00 or the cache capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if !(-720..=840).contains(&self.utc_offset_minutes) {
            return Err(CalendarError::InvalidConfig(format!(
                "utc offset {} minutes outside -720..=840",
                self.utc_offset_minutes
            )));
        }
        if self.cache_capacity == 0 {
            return Err(CalendarError::InvalidConfig(
                "cache capacity must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }
}
