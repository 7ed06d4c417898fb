//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for solarboost. Every option can
//! also be set through a `SOLARBOOST_*` environment variable.

use std::path::PathBuf;

use clap::Parser;

use crate::irradiance::{DEFAULT_ALBEDO, DEFAULT_AOD700, DEFAULT_PRECIPITABLE_WATER};

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about = "Sun position and clear-sky solar panel output calculator")]
pub struct Args {
    /// Date for calculations (e.g., "2024-06-21", "today", "tomorrow"); defaults to today
    #[arg(long, env = "SOLARBOOST_DATE")]
    pub date: Option<String>,
    /// Local time of day (HH:MM[:SS[.fffffffff]] or "now"); defaults to now
    #[arg(long, value_parser = parse_time_arg, env = "SOLARBOOST_TIME")]
    pub time: Option<TimeArg>,

    /// Observer latitude in decimal degrees (-90 to 90)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_latitude, env = "SOLARBOOST_LATITUDE")]
    pub latitude: f64,
    /// Observer longitude in decimal degrees (-180 to 180)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_longitude, env = "SOLARBOOST_LONGITUDE")]
    pub longitude: f64,
    /// UTC offset of the local time in hours (-12 to 14, fractions allowed)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, value_parser = parse_utc_offset,
          env = "SOLARBOOST_UTC_OFFSET", conflicts_with = "timezone")]
    pub utc_offset: f64,
    /// Time zone instead of a fixed offset ("system", "location", or IANA time zone name)
    #[arg(long, env = "SOLARBOOST_TIMEZONE")]
    pub timezone: Option<String>,
    /// Observer altitude above mean sea level (meters, may be negative)
    /// Valid range: -500m (Dead Sea) to 11000m (Troposphere limit for ISA formula)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, value_parser = parse_altitude, env = "SOLARBOOST_ALTITUDE")]
    pub altitude: f64,

    // ===================== SOLAR PANEL OPTIONS =====================
    /// Solar panel area in square meters (0.1 to 100)
    #[arg(long, default_value_t = 1.0, value_parser = parse_area, env = "SOLARBOOST_PANEL_AREA")]
    pub panel_area: f64,

    /// Solar panel efficiency in percent (1 to 30, typical 15-22 for silicon)
    #[arg(long, default_value_t = 20.0, value_parser = parse_efficiency, env = "SOLARBOOST_PANEL_EFFICIENCY")]
    pub panel_efficiency: f64,

    /// Solar panel tilt angle in degrees (0 = flat, 90 = vertical); defaults to the latitude
    #[arg(long, value_parser = parse_tilt, env = "SOLARBOOST_PANEL_TILT")]
    pub panel_tilt: Option<f64>,

    /// Solar panel azimuth in degrees (180 = facing south)
    #[arg(long, default_value_t = 180.0, value_parser = parse_azimuth, env = "SOLARBOOST_PANEL_AZIMUTH")]
    pub panel_azimuth: f64,

    // ===================== ATMOSPHERE OPTIONS =====================
    /// Ambient temperature in °C for refraction correction
    #[arg(long, default_value_t = 12.0, allow_hyphen_values = true, value_parser = parse_temperature,
          env = "SOLARBOOST_TEMPERATURE")]
    pub temperature: f64,

    /// Ground albedo for reflected radiation (0.0-1.0, 0.2 = grass, 0.8 = snow)
    #[arg(long, default_value_t = DEFAULT_ALBEDO, value_parser = parse_albedo, env = "SOLARBOOST_ALBEDO")]
    pub albedo: f64,

    /// Aerosol optical depth at 700 nm for the clear-sky model (0 to 0.45)
    #[arg(long, default_value_t = DEFAULT_AOD700, value_parser = parse_aod700, env = "SOLARBOOST_AOD700")]
    pub aod700: f64,

    /// Precipitable water in cm for the clear-sky model (0.2 to 10)
    #[arg(long, default_value_t = DEFAULT_PRECIPITABLE_WATER, value_parser = parse_precipitable_water,
          env = "SOLARBOOST_PRECIPITABLE_WATER")]
    pub precipitable_water: f64,

    // ===================== OUTPUT OPTIONS =====================
    /// Write a polar plot of the sun position as SVG to this path
    #[arg(long, env = "SOLARBOOST_PLOT")]
    pub plot: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, env = "SOLARBOOST_JSON")]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Panel tilt, falling back to the latitude in the northern hemisphere
    /// and flat elsewhere.
    pub fn effective_tilt(&self) -> f64 {
        self.panel_tilt.unwrap_or(if self.latitude > 0.0 { self.latitude } else { 0.0 })
    }
}

/// Requested time of day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeArg {
    Now,
    At(chrono::NaiveTime),
}

// ===================== CLI VALUE PARSERS =====================

fn parse_number(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !v.is_finite() {
        return Err(format!("Value must be a finite number, got {}", s));
    }
    Ok(v)
}

fn parse_time_arg(s: &str) -> Result<TimeArg, String> {
    if s.eq_ignore_ascii_case("now") {
        return Ok(TimeArg::Now);
    }
    crate::time::parse_time_ns(s).map(TimeArg::At)
}

fn parse_latitude(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(-90.0..=90.0).contains(&v) {
        return Err(format!("Latitude must be between -90 and 90, got {}", v));
    }
    Ok(v)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(-180.0..=180.0).contains(&v) {
        return Err(format!("Longitude must be between -180 and 180, got {}", v));
    }
    Ok(v)
}

fn parse_utc_offset(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(-12.0..=14.0).contains(&v) {
        return Err(format!("UTC offset must be between -12 and 14 hours, got {}", v));
    }
    Ok(v)
}

fn parse_altitude(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(-500.0..=11000.0).contains(&v) {
        return Err(format!("Altitude must be between -500 and 11000 meters, got {}", v));
    }
    Ok(v)
}

fn parse_area(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(0.1..=100.0).contains(&v) {
        return Err(format!("Panel area must be between 0.1 and 100 m², got {}", v));
    }
    Ok(v)
}

fn parse_efficiency(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(1.0..=30.0).contains(&v) {
        return Err(format!("Efficiency must be between 1 and 30 percent, got {}", v));
    }
    Ok(v)
}

fn parse_tilt(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(0.0..=90.0).contains(&v) {
        return Err(format!("Tilt must be between 0 and 90 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_azimuth(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(0.0..=360.0).contains(&v) {
        return Err(format!("Azimuth must be between 0 and 360 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_temperature(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(-90.0..=60.0).contains(&v) {
        return Err(format!("Temperature must be between -90 and 60 °C, got {}", v));
    }
    Ok(v)
}

fn parse_albedo(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("Albedo must be between 0.0 and 1.0, got {}", v));
    }
    Ok(v)
}

fn parse_aod700(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(0.0..=0.45).contains(&v) {
        return Err(format!("AOD700 must be between 0.0 and 0.45, got {}", v));
    }
    Ok(v)
}

fn parse_precipitable_water(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(0.2..=10.0).contains(&v) {
        return Err(format!("Precipitable water must be between 0.2 and 10 cm, got {}", v));
    }
    Ok(v)
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["solarboost", "--latitude", "51.5", "--longitude", "-0.12"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.utc_offset, 0.0);
        assert_eq!(args.altitude, 0.0);
        assert_eq!(args.panel_area, 1.0);
        assert_eq!(args.panel_efficiency, 20.0);
        assert_eq!(args.panel_azimuth, 180.0);
        assert_eq!(args.temperature, 12.0);
        assert_eq!(args.albedo, 0.25);
        assert_eq!(args.aod700, 0.1);
        assert_eq!(args.precipitable_water, 1.0);
        assert!(args.date.is_none());
        assert!(args.time.is_none());
        assert!(args.timezone.is_none());
        assert!(args.plot.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_tilt_defaults_to_latitude() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.effective_tilt(), 51.5);

        let south = Args::try_parse_from([
            "solarboost", "--latitude", "-33.9", "--longitude", "151.2",
        ])
        .unwrap();
        assert_eq!(south.effective_tilt(), 0.0);

        let explicit = parse(&["--panel-tilt", "10"]).unwrap();
        assert_eq!(explicit.effective_tilt(), 10.0);
    }

    #[test]
    fn test_time_argument() {
        assert_eq!(parse(&["--time", "now"]).unwrap().time, Some(TimeArg::Now));
        assert_eq!(
            parse(&["--time", "14:30"]).unwrap().time,
            Some(TimeArg::At(chrono::NaiveTime::from_hms_opt(14, 30, 0).unwrap()))
        );
        assert!(parse(&["--time", "25:00"]).is_err());
    }

    #[test]
    fn test_negative_values_accepted() {
        let args = parse(&["--utc-offset", "-5", "--altitude", "-400", "--temperature", "-20"]).unwrap();
        assert_eq!(args.utc_offset, -5.0);
        assert_eq!(args.altitude, -400.0);
        assert_eq!(args.temperature, -20.0);
    }

    #[test]
    fn test_utc_offset_conflicts_with_timezone() {
        assert!(parse(&["--utc-offset", "2", "--timezone", "Europe/Helsinki"]).is_err());
        assert!(parse(&["--timezone", "Europe/Helsinki"]).is_ok());
    }

    #[test]
    fn test_value_parsers_reject_out_of_range() {
        assert!(parse_latitude("91").is_err());
        assert!(parse_latitude("NaN").is_err());
        assert!(parse_longitude("-180.5").is_err());
        assert!(parse_utc_offset("14.5").is_err());
        assert!(parse_utc_offset("-12.5").is_err());
        assert!(parse_altitude("12000").is_err());
        assert!(parse_area("0.05").is_err());
        assert!(parse_area("101").is_err());
        assert!(parse_efficiency("0.2").is_err());
        assert!(parse_efficiency("31").is_err());
        assert!(parse_tilt("91").is_err());
        assert!(parse_azimuth("-1").is_err());
        assert!(parse_albedo("1.5").is_err());
        assert!(parse_aod700("0.5").is_err());
        assert!(parse_precipitable_water("0.1").is_err());
        assert!(parse_temperature("inf").is_err());
    }

    #[test]
    fn test_value_parsers_accept_bounds() {
        assert_eq!(parse_latitude("-90").unwrap(), -90.0);
        assert_eq!(parse_utc_offset("5.75").unwrap(), 5.75);
        assert_eq!(parse_area("0.1").unwrap(), 0.1);
        assert_eq!(parse_efficiency("30").unwrap(), 30.0);
        assert_eq!(parse_azimuth("360").unwrap(), 360.0);
        assert_eq!(parse_aod700("0.45").unwrap(), 0.45);
    }
}
