//! Error Types
//!
//! Failures that can surface while resolving the timestamp, locating the sun
//! or estimating panel output.

use thiserror::Error;

/// Errors from the astronomical side of the calculation.
#[derive(Debug, Error)]
pub enum SolarError {
    #[error("solar position calculation failed: {0}")]
    Position(#[from] solar_positioning::Error),

    #[error("the time {time} does not exist on {date} (DST gap)")]
    NonexistentLocalTime { date: chrono::NaiveDate, time: chrono::NaiveTime },

    #[error("invalid UTC offset of {0} hours")]
    InvalidOffset(f64),
}

/// Errors from the clear-sky production estimate.
///
/// These are reported to the user as a warning; they never abort a run.
#[derive(Debug, Error, PartialEq)]
pub enum EstimateError {
    #[error("sun position is not finite (elevation {elevation}, azimuth {azimuth})")]
    InvalidSunPosition { elevation: f64, azimuth: f64 },

    #[error("{name} evaluated to a non-finite value")]
    NonFinite { name: &'static str },
}
