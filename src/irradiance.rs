//! Clear-Sky Irradiance and Panel Output Calculations
//!
//! Implements the simplified Solis clear-sky model for estimating DNI, GHI and
//! DHI, projects them onto a tilted panel with the isotropic sky model, and
//! converts plane-of-array irradiance into electrical power.
//!
//! References:
//! - Ineichen, P. (2008). "A broadband simplified version of the Solis clear
//!   sky model", Solar Energy 82, 758-762.
//! - Liu, B. and Jordan, R. (1963). Isotropic sky diffuse transposition.

use serde::Serialize;
use tracing::debug;

use crate::error::EstimateError;
use crate::solar::SunPosition;

// ===================== CONSTANTS =====================

/// Standard sea-level pressure in Pa
pub const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Default extraterrestrial normal irradiance for the Solis fit (W/m²)
pub const DNI_EXTRA: f64 = 1364.0;

/// Default aerosol optical depth at 700 nm
pub const DEFAULT_AOD700: f64 = 0.1;

/// Default precipitable water column in cm
pub const DEFAULT_PRECIPITABLE_WATER: f64 = 1.0;

/// Default ground albedo
pub const DEFAULT_ALBEDO: f64 = 0.25;

/// Lowest precipitable water the Solis fit is valid for (cm)
const MIN_PRECIPITABLE_WATER: f64 = 0.2;

/// Production is reported for this many hours at the instantaneous rate
pub const ENERGY_WINDOW_HOURS: f64 = 1.0;

// ===================== CONFIGURATION =====================

/// Solar panel configuration
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PanelConfig {
    /// Panel area in square meters
    pub area_m2: f64,
    /// Panel efficiency in percent (typical silicon 15-22)
    pub efficiency_pct: f64,
    /// Panel tilt from horizontal in degrees (0 = flat, 90 = vertical)
    pub tilt_deg: f64,
    /// Panel azimuth in degrees (180 = facing south)
    pub azimuth_deg: f64,
    /// Ground albedo for reflected radiation (0.0 - 1.0)
    pub albedo: f64,
}

impl PanelConfig {
    pub fn new(area_m2: f64, efficiency_pct: f64, tilt_deg: f64, azimuth_deg: f64) -> Self {
        Self { area_m2, efficiency_pct, tilt_deg, azimuth_deg, albedo: DEFAULT_ALBEDO }
    }

    pub fn with_albedo(mut self, albedo: f64) -> Self {
        self.albedo = albedo;
        self
    }
}

/// Atmospheric state fed to the clear-sky model
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Atmosphere {
    /// Aerosol optical depth at 700 nm
    pub aod700: f64,
    /// Precipitable water in cm
    pub precipitable_water: f64,
    /// Station pressure in Pa
    pub pressure_pa: f64,
    /// Extraterrestrial normal irradiance in W/m²
    pub dni_extra: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            aod700: DEFAULT_AOD700,
            precipitable_water: DEFAULT_PRECIPITABLE_WATER,
            pressure_pa: SEA_LEVEL_PRESSURE_PA,
            dni_extra: DNI_EXTRA,
        }
    }
}

impl Atmosphere {
    /// Standard atmosphere at the given altitude.
    pub fn at_altitude(altitude_m: f64) -> Self {
        Self { pressure_pa: pressure_from_altitude(altitude_m), ..Self::default() }
    }

    pub fn with_aod700(mut self, aod700: f64) -> Self {
        self.aod700 = aod700;
        self
    }

    pub fn with_precipitable_water(mut self, cm: f64) -> Self {
        self.precipitable_water = cm;
        self
    }
}

// ===================== RESULTS =====================

/// Clear-sky irradiance components on a horizontal surface (W/m²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClearSky {
    /// Direct Normal Irradiance
    pub dni: f64,
    /// Global Horizontal Irradiance
    pub ghi: f64,
    /// Diffuse Horizontal Irradiance
    pub dhi: f64,
}

/// Irradiance on the tilted panel (W/m²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoaIrradiance {
    /// Total plane-of-array irradiance
    pub global: f64,
    /// Direct beam component
    pub beam: f64,
    /// Sky diffuse component
    pub sky_diffuse: f64,
    /// Ground reflected component
    pub ground_diffuse: f64,
    /// Angle of incidence in degrees
    pub aoi_deg: f64,
}

/// Estimated panel output at one instant
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Production {
    pub clear_sky: ClearSky,
    pub poa: PoaIrradiance,
    /// Instantaneous power (W)
    pub power_w: f64,
    /// Instantaneous power (kW)
    pub power_kw: f64,
    /// Energy if conditions held for one hour (kWh)
    pub energy_kwh: f64,
}

// ===================== UNIT CONVERSIONS =====================

/// Convert a percentage to a fraction (20 -> 0.2).
pub fn percent_to_fraction(percent: f64) -> f64 {
    percent / 100.0
}

/// Convert watts to kilowatts.
pub fn watts_to_kilowatts(watts: f64) -> f64 {
    watts / 1000.0
}

/// Station pressure in Pa from altitude using the ISA barometric formula.
///
/// Valid for the troposphere (< 11 km).
pub fn pressure_from_altitude(altitude_m: f64) -> f64 {
    if altitude_m.abs() < 1e-5 {
        return SEA_LEVEL_PRESSURE_PA;
    }
    // P = P0 * (1 - L*h/T0)^(g*M / R*L)
    SEA_LEVEL_PRESSURE_PA * (1.0 - 2.25577e-5 * altitude_m).powf(5.25588)
}

// ===================== GEOMETRY =====================

/// Calculate angle of incidence between sun rays and panel normal
///
/// # Arguments
/// * `sun_zenith_deg` - Apparent sun zenith angle in degrees
/// * `sun_azimuth_deg` - Sun azimuth in degrees (0 = North, 90 = East, 180 = South)
/// * `panel_tilt_deg` - Panel tilt from horizontal in degrees
/// * `panel_azimuth_deg` - Panel facing direction in degrees (180 = South)
///
/// # Returns
/// Angle of incidence in degrees (0 = sun perpendicular to panel)
pub fn angle_of_incidence(
    sun_zenith_deg: f64,
    sun_azimuth_deg: f64,
    panel_tilt_deg: f64,
    panel_azimuth_deg: f64,
) -> f64 {
    let zen = sun_zenith_deg.to_radians();
    let tilt = panel_tilt_deg.to_radians();
    let daz = (sun_azimuth_deg - panel_azimuth_deg).to_radians();

    let cos_aoi = zen.cos() * tilt.cos() + zen.sin() * tilt.sin() * daz.cos();
    cos_aoi.clamp(-1.0, 1.0).acos().to_degrees()
}

// ===================== SIMPLIFIED SOLIS CLEAR SKY MODEL =====================

/// Calculate clear-sky irradiance using the simplified Solis model
///
/// # Arguments
/// * `apparent_elevation_deg` - Apparent sun elevation in degrees
/// * `atmosphere` - Aerosol, water vapour and pressure state
///
/// # Returns
/// DNI, GHI and DHI in W/m². All three are zero with the sun at or below
/// the horizon.
pub fn simplified_solis(apparent_elevation_deg: f64, atmosphere: &Atmosphere) -> ClearSky {
    let aod = atmosphere.aod700;
    let w = atmosphere.precipitable_water.max(MIN_PRECIPITABLE_WATER);
    let ln_w = w.ln();
    let ln_p = (atmosphere.pressure_pa / SEA_LEVEL_PRESSURE_PA).ln();

    // Enhanced extraterrestrial irradiance
    let io0 = 1.08 * w.powf(0.0051);
    let i01 = 0.97 * w.powf(0.032);
    let i02 = 0.12 * w.powf(0.56);
    let i0p = atmosphere.dni_extra * (i02 * aod * aod + i01 * aod + io0 + 0.071 * ln_p);

    // Beam optical depth and exponent
    let tb1 = 1.82 + 0.056 * ln_w + 0.0071 * ln_w * ln_w;
    let tb0 = 0.33 + 0.045 * ln_w + 0.0096 * ln_w * ln_w;
    let tbp = 0.0089 * w + 0.13;
    let taub = tb1 * aod + tb0 + tbp * ln_p;

    let b1 = 0.00925 * aod * aod + 0.0148 * aod - 0.0172;
    let b0 = -0.7565 * aod * aod + 0.5057 * aod + 0.4557;
    let b = b1 * ln_w + b0;

    // Global optical depth and exponent
    let tg1 = 1.24 + 0.047 * ln_w + 0.0061 * ln_w * ln_w;
    let tg0 = 0.27 + 0.043 * ln_w + 0.0090 * ln_w * ln_w;
    let tgp = 0.0079 * w + 0.1;
    let taug = tg1 * aod + tg0 + tgp * ln_p;

    let g = -0.0147 * ln_w - 0.3079 * aod * aod + 0.2846 * aod + 0.3798;

    // Diffuse optical depth and exponent
    let taud = diffuse_optical_depth(w, aod, ln_p);
    let dp = 1.0 / (18.0 + 152.0 * aod);
    let d = -0.337 * aod * aod + 0.63 * aod + 0.116 + dp * ln_p;

    // Floor keeps night-time values at zero instead of NaN
    let sin_elev = apparent_elevation_deg.to_radians().sin().max(1e-30);

    let dni = i0p * (-taub / sin_elev.powf(b)).exp();
    let ghi = i0p * (-taug / sin_elev.powf(g)).exp() * sin_elev;
    let dhi = i0p * (-taud / sin_elev.powf(d)).exp();

    ClearSky { dni, ghi, dhi }
}

/// Diffuse optical depth; coefficients switch at AOD700 = 0.05.
fn diffuse_optical_depth(w: f64, aod: f64, ln_p: f64) -> f64 {
    let (td4, td3, td2, td1, td0, tdp) = if aod < 0.05 {
        (
            86.0 * w - 13800.0,
            -3.11 * w + 79.4,
            -0.23 * w + 74.8,
            0.092 * w - 8.86,
            0.0042 * w + 3.12,
            -0.83 * (1.0 + aod).powf(-17.2),
        )
    } else {
        (
            -0.21 * w + 11.6,
            0.27 * w - 20.7,
            -0.134 * w + 15.5,
            0.0554 * w - 5.71,
            0.0057 * w + 2.94,
            -0.71 * (1.0 + aod).powf(-15.0),
        )
    };

    td4 * aod.powi(4) + td3 * aod.powi(3) + td2 * aod.powi(2) + td1 * aod + td0 + tdp * ln_p
}

// ===================== PLANE OF ARRAY IRRADIANCE =====================

/// Calculate irradiance on the tilted plane-of-array
///
/// Sky diffuse uses the isotropic model; ground reflection scales GHI by
/// albedo and the ground view factor.
///
/// # Arguments
/// * `clear_sky` - Horizontal irradiance components
/// * `sun_zenith_deg` - Apparent sun zenith angle in degrees
/// * `sun_azimuth_deg` - Sun azimuth in degrees
/// * `panel` - Panel orientation and ground albedo
pub fn plane_of_array(
    clear_sky: &ClearSky,
    sun_zenith_deg: f64,
    sun_azimuth_deg: f64,
    panel: &PanelConfig,
) -> PoaIrradiance {
    let aoi_deg = angle_of_incidence(sun_zenith_deg, sun_azimuth_deg, panel.tilt_deg, panel.azimuth_deg);
    let cos_aoi = aoi_deg.to_radians().cos();
    let cos_tilt = panel.tilt_deg.to_radians().cos();

    let beam = (clear_sky.dni * cos_aoi).max(0.0);
    let sky_diffuse = clear_sky.dhi * (1.0 + cos_tilt) / 2.0;
    let ground_diffuse = clear_sky.ghi * panel.albedo * (1.0 - cos_tilt) / 2.0;

    PoaIrradiance {
        global: beam + sky_diffuse + ground_diffuse,
        beam,
        sky_diffuse,
        ground_diffuse,
        aoi_deg,
    }
}

// ===================== POWER OUTPUT CALCULATION =====================

/// Electrical power in watts from plane-of-array irradiance.
///
/// P = POA * Area * Efficiency
pub fn power_watts(poa_w_m2: f64, panel: &PanelConfig) -> f64 {
    poa_w_m2 * panel.area_m2 * percent_to_fraction(panel.efficiency_pct)
}

/// Estimate clear-sky panel output for one sun position
///
/// # Errors
/// Returns an error if the sun position or any intermediate value is not
/// finite.
pub fn estimate_production(
    panel: &PanelConfig,
    sun: &SunPosition,
    atmosphere: &Atmosphere,
) -> Result<Production, EstimateError> {
    if !sun.elevation.is_finite() || !sun.azimuth.is_finite() {
        return Err(EstimateError::InvalidSunPosition {
            elevation: sun.elevation,
            azimuth: sun.azimuth,
        });
    }

    let clear_sky = simplified_solis(sun.elevation, atmosphere);
    ensure_finite("clear-sky irradiance", clear_sky.dni + clear_sky.ghi + clear_sky.dhi)?;

    let poa = plane_of_array(&clear_sky, 90.0 - sun.elevation, sun.azimuth, panel);
    ensure_finite("plane-of-array irradiance", poa.global)?;

    let power_w = power_watts(poa.global, panel).max(0.0);
    ensure_finite("power output", power_w)?;

    let power_kw = watts_to_kilowatts(power_w);
    let energy_kwh = power_kw * ENERGY_WINDOW_HOURS;

    debug!(
        dni = clear_sky.dni,
        ghi = clear_sky.ghi,
        dhi = clear_sky.dhi,
        poa = poa.global,
        aoi = poa.aoi_deg,
        power_w,
        "clear-sky production"
    );

    Ok(Production { clear_sky, poa, power_w, power_kw, energy_kwh })
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), EstimateError> {
    if value.is_finite() { Ok(()) } else { Err(EstimateError::NonFinite { name }) }
}

// ===================== FORMATTING HELPERS =====================

/// Format irradiance for display
pub fn format_irradiance(w_per_m2: f64) -> String {
    format!("{:.2} W/m²", w_per_m2)
}

/// Format power in kW for display
pub fn format_power_kw(kw: f64) -> String {
    format!("{:.3} kW", kw)
}

/// Format energy in kWh for display
pub fn format_energy_kwh(kwh: f64) -> String {
    format!("{:.3} kWh", kwh)
}

// ===================== TESTS =====================
