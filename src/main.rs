use anyhow::{Context, Result, anyhow};
use chrono_english::{Dialect, parse_date_string};
use clap::Parser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod error;
mod irradiance;
mod output;
mod plot;
mod solar;
mod time;

use cli::{Args, TimeArg};
use irradiance::{Atmosphere, PanelConfig, estimate_production};
use output::{Inputs, Report};
use solar::SolarCalc;
use time::{Zone, now_in, resolve_local};

// ===================== MAIN =====================

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose)?;

    let zone = match &args.timezone {
        Some(name) => Zone::from_name(name, args.longitude, args.latitude),
        None => Zone::Offset(args.utc_offset),
    };
    let now = now_in(zone)?;

    // Anchor 'today' to the target zone
    let date = match &args.date {
        Some(s) => parse_date_string(s, now, Dialect::Us)
            .map_err(|e| anyhow!("Invalid date '{}': {}", s, e))?
            .date_naive(),
        None => now.date_naive(),
    };

    let timestamp = match args.time.unwrap_or(TimeArg::Now) {
        TimeArg::Now if args.date.is_none() => now,
        TimeArg::Now => resolve_local(zone, date, now.time())?,
        TimeArg::At(t) => resolve_local(zone, date, t)?,
    };
    debug!(%timestamp, zone = %zone.label(), "resolved timestamp");

    let calc = SolarCalc::new(
        args.latitude,
        args.longitude,
        args.altitude,
        args.temperature,
        timestamp,
    )
    .context("Failed to set up solar calculation")?;

    let sun = calc.position(timestamp).context("Failed to compute sun position")?;
    debug!(azimuth = sun.azimuth, elevation = sun.elevation, "sun position");

    let daylight = calc.daylight(timestamp).context("Failed to compute sunrise and sunset")?;
    debug!(transit = %daylight.transit(), day_length = ?daylight.day_length(), "daylight");

    let panel = PanelConfig::new(
        args.panel_area,
        args.panel_efficiency,
        args.effective_tilt(),
        args.panel_azimuth,
    )
    .with_albedo(args.albedo);
    let atmosphere = Atmosphere::at_altitude(args.altitude)
        .with_aod700(args.aod700)
        .with_precipitable_water(args.precipitable_water);

    let production = estimate_production(&panel, &sun, &atmosphere);
    if let Err(e) = &production {
        warn!("Could not calculate solar energy production: {}", e);
    }

    let report = Report::new(
        Inputs {
            timestamp,
            zone: zone.label(),
            latitude: args.latitude,
            longitude: args.longitude,
            altitude_m: args.altitude,
            panel,
            atmosphere,
        },
        sun,
        daylight,
        production,
    );

    if args.json {
        println!("{}", output::render_json(&report).context("Failed to serialize report")?);
    } else {
        print!("{}", output::render_text(&report));
    }

    if let Some(path) = &args.plot {
        std::fs::write(path, plot::render_svg(sun.azimuth, sun.elevation))
            .with_context(|| format!("Failed to write plot to {}", path.display()))?;
        info!("Sun position plot written to {}", path.display());
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}
