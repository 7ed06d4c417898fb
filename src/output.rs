//! Output Formatting Module
//!
//! Builds the run report and renders it either as a terminal summary or as
//! JSON.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::error::EstimateError;
use crate::irradiance::{self, Atmosphere, ENERGY_WINDOW_HOURS, PanelConfig, Production};
use crate::solar::{Daylight, SunPosition, is_polar_latitude};
use crate::time::format_day_length;

const CLEAR_SKY_NOTE: &str = "Note: These calculations assume clear sky conditions. \
Actual production may be lower due to clouds, dust, or other factors.";

const PRODUCTION_HINT: &str = "Solar energy calculations require valid sun position data. \
Please ensure the sun is above the horizon.";

const POLAR_HINT: &str = "In polar regions, there may be periods of midnight sun or polar night \
depending on the season.";

const NO_EVENTS_WARNING: &str =
    "Could not calculate sunrise/sunset times for the given location and date.";

// ===================== REPORT =====================

/// Inputs echoed back in the report.
#[derive(Debug, Clone, Serialize)]
pub struct Inputs {
    pub timestamp: DateTime<FixedOffset>,
    pub zone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub panel: PanelConfig,
    pub atmosphere: Atmosphere,
}

/// Sunrise and sunset for the local day.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DaylightReport {
    Regular {
        sunrise: DateTime<FixedOffset>,
        transit: DateTime<FixedOffset>,
        sunset: DateTime<FixedOffset>,
        day_length_seconds: i64,
    },
    PolarDay { transit: DateTime<FixedOffset> },
    PolarNight { transit: DateTime<FixedOffset> },
}

impl From<Daylight> for DaylightReport {
    fn from(daylight: Daylight) -> Self {
        match daylight {
            Daylight::Regular { sunrise, transit, sunset } => DaylightReport::Regular {
                sunrise,
                transit,
                sunset,
                day_length_seconds: crate::solar::day_length_seconds(sunrise, sunset),
            },
            Daylight::PolarDay { transit } => DaylightReport::PolarDay { transit },
            Daylight::PolarNight { transit } => DaylightReport::PolarNight { transit },
        }
    }
}

/// Everything a single run computes.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub inputs: Inputs,
    pub sun: SunPosition,
    pub daylight: DaylightReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<Production>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_error: Option<String>,
}

impl Report {
    pub fn new(
        inputs: Inputs,
        sun: SunPosition,
        daylight: Daylight,
        production: Result<Production, EstimateError>,
    ) -> Self {
        let (production, production_error) = match production {
            Ok(p) => (Some(p), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self { inputs, sun, daylight: daylight.into(), production, production_error }
    }
}

// ===================== JSON OUTPUT =====================

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// ===================== TERMINAL OUTPUT =====================

/// Render the human-readable terminal report.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &Report) -> std::fmt::Result {
    let inputs = &report.inputs;

    // Section 1: Inputs
    writeln!(out, "☀️ SolarBoost")?;
    writeln!(
        out,
        "Date/Time: {} ({})",
        inputs.timestamp.format("%Y-%m-%d %H:%M:%S"),
        inputs.zone
    )?;
    writeln!(
        out,
        "Location:  {:.4}°, {:.4}° at {:.0} m",
        inputs.latitude, inputs.longitude, inputs.altitude_m
    )?;
    writeln!(
        out,
        "Panel:     {:.2} m², {:.1}% efficiency, tilt {:.1}°, azimuth {:.1}°",
        inputs.panel.area_m2,
        inputs.panel.efficiency_pct,
        inputs.panel.tilt_deg,
        inputs.panel.azimuth_deg
    )?;

    // Section 2: Sun position
    writeln!(out)?;
    writeln!(out, "Sun Position")?;
    writeln!(out, "  Azimuth:   {:.2}°", report.sun.azimuth)?;
    writeln!(out, "  Elevation: {:.2}°", report.sun.elevation)?;

    // Section 3: Daylight
    writeln!(out)?;
    writeln!(out, "Daylight Information")?;
    match &report.daylight {
        DaylightReport::Regular { sunrise, sunset, day_length_seconds, .. } => {
            writeln!(out, "  Sunrise:    {}", sunrise.format("%H:%M"))?;
            writeln!(out, "  Sunset:     {}", sunset.format("%H:%M"))?;
            writeln!(out, "  Day Length: {}", format_day_length(*day_length_seconds))?;
        }
        DaylightReport::PolarDay { .. } | DaylightReport::PolarNight { .. } => {
            let state = if matches!(report.daylight, DaylightReport::PolarDay { .. }) {
                "Polar day: the sun stays above the horizon all day."
            } else {
                "Polar night: the sun stays below the horizon all day."
            };
            writeln!(out, "  {}", state)?;
            if is_polar_latitude(inputs.latitude) {
                writeln!(out, "  {}", POLAR_HINT)?;
            } else {
                writeln!(out, "  Warning: {}", NO_EVENTS_WARNING)?;
            }
        }
    }

    // Section 4: Production
    writeln!(out)?;
    writeln!(out, "Solar Energy Production Estimate")?;
    match (&report.production, &report.production_error) {
        (Some(p), _) => {
            writeln!(out, "  Solar Irradiance: {}", irradiance::format_irradiance(p.poa.global))?;
            writeln!(out, "  Power Output:     {}", irradiance::format_power_kw(p.power_kw))?;
            writeln!(
                out,
                "  Energy ({} hour):  {}",
                ENERGY_WINDOW_HOURS,
                irradiance::format_energy_kwh(p.energy_kwh)
            )?;
            writeln!(
                out,
                "  Clear sky:        DNI {:.1}, GHI {:.1}, DHI {:.1} W/m² (AOI {:.1}°)",
                p.clear_sky.dni, p.clear_sky.ghi, p.clear_sky.dhi, p.poa.aoi_deg
            )?;
            writeln!(out)?;
            writeln!(out, "{}", CLEAR_SKY_NOTE)?;
        }
        (None, reason) => {
            writeln!(
                out,
                "  Warning: Could not calculate solar energy production: {}",
                reason.as_deref().unwrap_or("unknown error")
            )?;
            writeln!(out, "  {}", PRODUCTION_HINT)?;
        }
    }

    Ok(())
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::offset_from_hours;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        offset_from_hours(1.0).unwrap().with_ymd_and_hms(2024, 6, 21, h, m, 0).unwrap()
    }

    fn inputs(latitude: f64) -> Inputs {
        Inputs {
            timestamp: at(12, 0),
            zone: "UTC+1".to_string(),
            latitude,
            longitude: -0.12,
            altitude_m: 0.0,
            panel: PanelConfig::new(1.0, 20.0, 30.0, 180.0),
            atmosphere: Atmosphere::default(),
        }
    }

    fn sun() -> SunPosition {
        SunPosition { azimuth: 181.234, elevation: 61.956, zenith: 28.044 }
    }

    fn regular() -> Daylight {
        Daylight::Regular { sunrise: at(4, 43), transit: at(13, 2), sunset: at(21, 21) }
    }

    fn production() -> Result<Production, EstimateError> {
        irradiance::estimate_production(
            &PanelConfig::new(1.0, 20.0, 30.0, 180.0),
            &sun(),
            &Atmosphere::default(),
        )
    }

    #[test]
    fn test_text_report_sections() {
        let report = Report::new(inputs(51.5), sun(), regular(), production());
        let text = render_text(&report);

        assert!(text.contains("Azimuth:   181.23°"), "{}", text);
        assert!(text.contains("Elevation: 61.96°"), "{}", text);
        assert!(text.contains("Sunrise:    04:43"), "{}", text);
        assert!(text.contains("Sunset:     21:21"), "{}", text);
        assert!(text.contains("Day Length: 16h 38m"), "{}", text);
        assert!(text.contains(" W/m²"));
        assert!(text.contains(" kW"));
        assert!(text.contains(" kWh"));
        assert!(text.contains("assume clear sky conditions"));
    }

    #[test]
    fn test_text_report_polar_message() {
        let daylight = Daylight::PolarDay { transit: at(13, 0) };
        let text = render_text(&Report::new(inputs(69.6), sun(), daylight, production()));
        assert!(text.contains("Polar day"));
        assert!(text.contains("midnight sun or polar night"));
        assert!(!text.contains("Could not calculate sunrise/sunset"));
    }

    #[test]
    fn test_text_report_missing_events_warning_outside_polar_circle() {
        let daylight = Daylight::PolarNight { transit: at(13, 0) };
        let text = render_text(&Report::new(inputs(60.0), sun(), daylight, production()));
        assert!(text.contains("Could not calculate sunrise/sunset times"));
    }

    #[test]
    fn test_text_report_production_failure() {
        let err = EstimateError::NonFinite { name: "power output" };
        let text = render_text(&Report::new(inputs(51.5), sun(), regular(), Err(err)));
        assert!(text.contains(
            "Could not calculate solar energy production: power output evaluated to a non-finite value"
        ));
        assert!(text.contains("Please ensure the sun is above the horizon."));
        assert!(!text.contains("assume clear sky conditions"));
    }

    #[test]
    fn test_json_report() {
        let report = Report::new(inputs(51.5), sun(), regular(), production());
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(json["daylight"]["kind"], "regular");
        assert_eq!(json["daylight"]["day_length_seconds"], 16 * 3600 + 38 * 60);
        assert_eq!(json["inputs"]["zone"], "UTC+1");
        assert!(json["production"]["power_kw"].as_f64().unwrap() > 0.0);
        assert!(json.get("production_error").is_none());
    }

    #[test]
    fn test_json_report_with_error() {
        let err = EstimateError::NonFinite { name: "power output" };
        let daylight = Daylight::PolarNight { transit: at(13, 0) };
        let report = Report::new(inputs(80.0), sun(), daylight, Err(err));
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(json["daylight"]["kind"], "polar_night");
        assert!(json.get("production").is_none());
        assert!(json["production_error"].as_str().unwrap().contains("non-finite"));
    }
}
