//! Error types for the crate.

use crate::ephemeris::Body;

/// Error type for all fallible calendar operations.
///
/// None of these are transient: the searches are deterministic, so repeating
/// a failed call fails the same way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// The ephemeris found no crossing of the target angle inside the window.
    #[error("no {body} crossing of {target_deg}° within {window_days} days after JD {start}")]
    EphemerisNotFound {
        /// Body whose angle was searched.
        body: Body,
        /// Target longitude or phase angle, in degrees.
        target_deg: f64,
        /// Start of the search window, Julian date (UT).
        start: f64,
        /// Length of the search window, in days.
        window_days: f64,
    },

    /// The year lies outside the range covered by the ephemeris.
    #[error("year {year} outside supported range {min}..={max}")]
    InvalidYear {
        /// The rejected year.
        year: i32,
        /// First supported year.
        min: i32,
        /// Last supported year.
        max: i32,
    },

    /// The number of lunations between two winter solstices is neither 13
    /// nor 14, which only an inconsistent ephemeris can produce.
    #[error("{count} lunar phase cycles around the winter solstices of {year}, expected 13 or 14")]
    CycleCount {
        /// Year whose cycles were computed.
        year: i32,
        /// Number of cycles found.
        count: usize,
    },

    /// Rejected configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CalendarError>;
