//! EPSG:4326 (WGS84 degrees) to EPSG:3857 (spherical Web Mercator metres).

use std::f64::consts::PI;

/// WGS84 semi-major axis, used as the sphere radius by EPSG:3857.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Project a single coordinate.
///
/// Latitudes past the usual ±85.0511° tile limit still project to a finite
/// `y`. Returns `None` for non-finite input, the poles (`|lat| >= 90`, where
/// `y` is infinite) and `|lon| > 180`.
pub fn to_web_mercator(latitude: f64, longitude: f64) -> Option<(f64, f64)> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if latitude.abs() >= 90.0 || longitude.abs() > 180.0 {
        return None;
    }
    let x = EARTH_RADIUS_M * longitude.to_radians();
    let y = EARTH_RADIUS_M * (PI / 4.0 + latitude.to_radians() / 2.0).tan().ln();
    y.is_finite().then_some((x, y))
}
