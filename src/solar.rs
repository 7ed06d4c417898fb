//! Solar Position Calculation Module
//!
//! Provides the solar calculation context used for the sun position at the
//! requested instant and for the day's sunrise, transit and sunset.
//! Uses the NREL SPA (Solar Position Algorithm) for high-precision calculations.

use chrono::{DateTime, Datelike, FixedOffset};
use serde::Serialize;
use solar_positioning::{
    Horizon, spa,
    time::DeltaT,
    types::{RefractionCorrection, SunriseResult},
};
use tracing::debug;

use crate::error::SolarError;
use crate::irradiance::pressure_from_altitude;

/// Local day length used to wrap sunset-before-sunrise pairs.
const SECONDS_PER_DAY: i64 = 86_400;

/// Latitude beyond which midnight sun and polar night occur.
pub const POLAR_CIRCLE_LAT: f64 = 66.5;

// ===================== TYPES =====================

/// Apparent sun position at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    /// Compass bearing in degrees, 0 = North, clockwise, in [0, 360)
    pub azimuth: f64,
    /// Apparent (refraction-corrected) elevation in degrees, in [-90, 90]
    pub elevation: f64,
    /// Apparent zenith angle in degrees
    pub zenith: f64,
}

impl From<solar_positioning::SolarPosition> for SunPosition {
    fn from(pos: solar_positioning::SolarPosition) -> Self {
        Self {
            azimuth: pos.azimuth(),
            elevation: pos.elevation_angle(),
            zenith: pos.zenith_angle(),
        }
    }
}

/// Sun events for one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Daylight {
    Regular {
        sunrise: DateTime<FixedOffset>,
        transit: DateTime<FixedOffset>,
        sunset: DateTime<FixedOffset>,
    },
    /// Sun stays above the horizon (midnight sun)
    PolarDay { transit: DateTime<FixedOffset> },
    /// Sun stays below the horizon
    PolarNight { transit: DateTime<FixedOffset> },
}

impl Daylight {
    pub fn transit(&self) -> DateTime<FixedOffset> {
        match self {
            Daylight::Regular { transit, .. }
            | Daylight::PolarDay { transit }
            | Daylight::PolarNight { transit } => *transit,
        }
    }

    /// Sunrise and sunset, if the sun crosses the horizon today.
    pub fn events(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        match self {
            Daylight::Regular { sunrise, sunset, .. } => Some((*sunrise, *sunset)),
            _ => None,
        }
    }

    /// Day length in seconds for a regular day.
    pub fn day_length(&self) -> Option<i64> {
        self.events().map(|(sr, ss)| day_length_seconds(sr, ss))
    }
}

impl From<SunriseResult<DateTime<FixedOffset>>> for Daylight {
    fn from(res: SunriseResult<DateTime<FixedOffset>>) -> Self {
        match res {
            SunriseResult::RegularDay { sunrise, transit, sunset } => {
                Daylight::Regular { sunrise, transit, sunset }
            }
            SunriseResult::AllDay { transit } => Daylight::PolarDay { transit },
            SunriseResult::AllNight { transit } => Daylight::PolarNight { transit },
        }
    }
}

// ===================== SOLAR CALCULATION CONTEXT =====================

/// Context for solar position calculations.
///
/// Encapsulates observer location, altitude and atmospheric refraction
/// settings so every position in a run is computed consistently.
#[derive(Debug, Clone, Copy)]
pub struct SolarCalc {
    /// Observer latitude in degrees
    pub lat: f64,
    /// Observer longitude in degrees
    pub lon: f64,
    /// Observer altitude in meters
    pub alt: f64,
    /// Delta-T correction for TT-UT1 difference
    pub delta_t: f64,
    /// Atmospheric refraction correction
    pub refr: Option<RefractionCorrection>,
}

impl SolarCalc {
    /// Build a context for the date of `t`.
    ///
    /// Refraction uses the station pressure implied by `alt` and the given
    /// air temperature.
    pub fn new(
        lat: f64,
        lon: f64,
        alt: f64,
        temperature_c: f64,
        t: DateTime<FixedOffset>,
    ) -> Result<Self, SolarError> {
        let delta_t = DeltaT::estimate_from_date(t.year(), t.month())?;
        let pressure_hpa = pressure_from_altitude(alt) / 100.0;
        let refr = Some(RefractionCorrection::new(pressure_hpa, temperature_c)?);
        debug!(delta_t, pressure_hpa, temperature_c, "solar context");
        Ok(Self { lat, lon, alt, delta_t, refr })
    }

    /// Get the apparent solar position at a given time.
    pub fn position(&self, t: DateTime<FixedOffset>) -> Result<SunPosition, SolarError> {
        let pos = spa::solar_position(t, self.lat, self.lon, self.alt, self.delta_t, self.refr)?;
        Ok(pos.into())
    }

    /// Sunrise, transit and sunset for the local calendar day containing `date`.
    pub fn daylight(&self, date: DateTime<FixedOffset>) -> Result<Daylight, SolarError> {
        let res = spa::sunrise_sunset_for_horizon(
            date,
            self.lat,
            self.lon,
            self.delta_t,
            Horizon::SunriseSunset,
        )?;
        Ok(res.into())
    }
}

// ===================== HELPER FUNCTIONS =====================

/// Day length from sunrise to sunset, in seconds.
///
/// When the local day boundary splits the solar day (zone offset far from
/// the longitude's solar time), sunset can precede sunrise on the clock; the
/// difference is wrapped into a single day.
pub fn day_length_seconds(sunrise: DateTime<FixedOffset>, sunset: DateTime<FixedOffset>) -> i64 {
    (sunset - sunrise).num_seconds().rem_euclid(SECONDS_PER_DAY)
}

/// Whether a latitude lies inside one of the polar circles.
pub fn is_polar_latitude(lat: f64) -> bool {
    lat.abs() > POLAR_CIRCLE_LAT
}

// ===================== TESTS =====================
