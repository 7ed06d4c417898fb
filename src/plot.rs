//! Polar Sun Position Diagram
//!
//! Renders the sun's position on a sky dome as a standalone SVG document.
//! North is up and east is right; the zenith sits at the centre and the
//! horizon on the outer ring.

/// Compass points drawn around the dome, by azimuth.
const COMPASS: [(&str, f64); 8] = [
    ("N", 0.0),
    ("NE", 45.0),
    ("E", 90.0),
    ("SE", 135.0),
    ("S", 180.0),
    ("SW", 225.0),
    ("W", 270.0),
    ("NW", 315.0),
];

/// Radial distances (degrees from zenith) of the elevation rings.
const RINGS: [f64; 3] = [30.0, 60.0, 90.0];

const SIZE: f64 = 500.0;
const MARGIN: f64 = 60.0;
const TITLE_HEIGHT: f64 = 40.0;

/// Convert a compass bearing into a math angle in degrees.
///
/// 0 = East, counter-clockwise, so North maps to 90 and South to 270.
pub fn polar_angle_deg(azimuth_deg: f64) -> f64 {
    (450.0 - azimuth_deg).rem_euclid(360.0)
}

/// Distance from the zenith in degrees (0 at the zenith, 90 on the horizon).
pub fn radial_distance(elevation_deg: f64) -> f64 {
    90.0 - elevation_deg
}

/// Render the sun position diagram.
///
/// # Arguments
/// * `azimuth_deg` - Sun azimuth in degrees (0 = North, clockwise)
/// * `elevation_deg` - Apparent sun elevation in degrees
///
/// # Returns
/// A complete SVG document. A sun below the horizon is left off the dome
/// and noted in the title.
pub fn render_svg(azimuth_deg: f64, elevation_deg: f64) -> String {
    let cx = SIZE / 2.0;
    let cy = TITLE_HEIGHT + SIZE / 2.0;
    let scale = (SIZE / 2.0 - MARGIN) / 90.0;
    let height = SIZE + TITLE_HEIGHT;

    let to_xy = |azimuth: f64, radial: f64| {
        let theta = polar_angle_deg(azimuth).to_radians();
        (cx + radial * scale * theta.cos(), cy - radial * scale * theta.sin())
    };

    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg viewBox="0 0 {SIZE} {height}" width="{SIZE}" height="{height}" xmlns="http://www.w3.org/2000/svg">"#
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{SIZE}" height="{height}" fill="white"/>"#
    ));

    // Title
    let mut title = format!(
        "Sun Position: Azimuth={:.1}°, Elevation={:.1}°",
        azimuth_deg, elevation_deg
    );
    if elevation_deg < 0.0 {
        title.push_str(" (below horizon)");
    }
    svg.push_str(&format!(
        r#"<text x="{cx}" y="28" font-size="16" font-family="sans-serif" text-anchor="middle">{title}</text>"#
    ));

    // Elevation rings
    for radial in RINGS {
        let r = radial * scale;
        let dash = if radial == 90.0 { r#" stroke-dasharray="6,4""# } else { "" };
        svg.push_str(&format!(
            r##"<circle cx="{cx}" cy="{cy}" r="{r:.1}" fill="none" stroke="#999999" stroke-width="1"{dash}/>"##
        ));
        svg.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" font-size="11" font-family="sans-serif" fill="#666666">{:.0}°</text>"##,
            cx + 4.0,
            cy - r - 4.0,
            90.0 - radial
        ));
    }

    // Compass spokes and labels
    for (label, azimuth) in COMPASS {
        let (x, y) = to_xy(azimuth, 90.0);
        svg.push_str(&format!(
            r##"<line x1="{cx}" y1="{cy}" x2="{x:.1}" y2="{y:.1}" stroke="#dddddd" stroke-width="1"/>"##
        ));
        let (lx, ly) = to_xy(azimuth, 100.0);
        svg.push_str(&format!(
            r#"<text x="{lx:.1}" y="{:.1}" font-size="13" font-family="sans-serif" text-anchor="middle">{label}</text>"#,
            ly + 4.0
        ));
    }

    // Sun marker
    if elevation_deg >= 0.0 {
        let (x, y) = to_xy(azimuth_deg, radial_distance(elevation_deg));
        svg.push_str(&format!(
            r#"<circle class="sun" cx="{x:.1}" cy="{y:.1}" r="10" fill="yellow" stroke="orange" stroke-width="2"/>"#
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_angle_compass_points() {
        assert_eq!(polar_angle_deg(0.0), 90.0);
        assert_eq!(polar_angle_deg(90.0), 0.0);
        assert_eq!(polar_angle_deg(180.0), 270.0);
        assert_eq!(polar_angle_deg(270.0), 180.0);
        assert_eq!(polar_angle_deg(360.0), 90.0);
    }

    #[test]
    fn test_polar_angle_stays_in_range() {
        for az in [0.0, 12.5, 89.9, 90.1, 179.0, 359.99] {
            let a = polar_angle_deg(az);
            assert!((0.0..360.0).contains(&a), "polar angle {} for azimuth {}", a, az);
        }
    }

    #[test]
    fn test_radial_distance() {
        assert_eq!(radial_distance(90.0), 0.0);
        assert_eq!(radial_distance(0.0), 90.0);
        assert_eq!(radial_distance(30.0), 60.0);
    }

    #[test]
    fn test_svg_structure() {
        let svg = render_svg(135.0, 40.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Sun Position: Azimuth=135.0°, Elevation=40.0°"));
        assert!(!svg.contains("below horizon"));
        for label in ["N", "NE", "E", "SE", "S", "SW", "W", "NW"] {
            assert!(svg.contains(&format!(">{}</text>", label)), "missing label {}", label);
        }
        for ring in ["60°", "30°", "0°"] {
            assert!(svg.contains(&format!(">{}</text>", ring)), "missing ring label {}", ring);
        }
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains(r#"fill="yellow" stroke="orange""#));
    }

    #[test]
    fn test_sun_marker_placement() {
        // Due south at 0° elevation lands straight below the centre on the horizon ring
        let svg = render_svg(180.0, 0.0);
        let cx = SIZE / 2.0;
        let cy = TITLE_HEIGHT + SIZE / 2.0;
        let expected_y = cy + (SIZE / 2.0 - MARGIN);
        assert!(
            svg.contains(&format!(r#"class="sun" cx="{:.1}" cy="{:.1}""#, cx, expected_y)),
            "sun marker not at the south horizon:\n{}",
            svg
        );
    }

    #[test]
    fn test_sun_below_horizon_is_not_drawn() {
        let svg = render_svg(10.0, -15.0);
        assert!(svg.contains("(below horizon)"));
        assert!(!svg.contains(r#"class="sun""#));
    }
}
