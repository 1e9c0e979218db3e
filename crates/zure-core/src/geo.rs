//! Geodesic helpers on a spherical Earth.
//!
//! Walking-scale distances make the haversine formula on a mean-radius sphere
//! accurate enough; no ellipsoidal correction is applied.

use crate::types::Coordinate;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres between `a` and `b`.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lng = (b.lng() - a.lng()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    EARTH_RADIUS_M * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial forward azimuth from `a` to `b`, degrees clockwise from true north
/// in `[0, 360)`. A point's bearing to itself is `0`.
pub fn bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let d_lng = (b.lng() - a.lng()).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Fold any finite angle into `[0, 360)`. Non-finite input maps to `0`.
pub fn normalize_bearing(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let r = deg % 360.0;
    let r = if r < 0.0 { r + 360.0 } else { r };
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Round a bearing to one decimal place without ever producing `360.0`.
pub fn round_bearing(deg: f64) -> f64 {
    normalize_bearing((deg * 10.0).round() / 10.0)
}

/// Signed shortest-arc difference `bearing - target`, in `(-180, 180]`.
pub fn angular_difference(bearing: f64, target: f64) -> f64 {
    let diff = normalize_bearing(bearing) - normalize_bearing(target);
    if diff > 180.0 {
        diff - 360.0
    } else if diff <= -180.0 {
        diff + 360.0
    } else {
        diff
    }
}

/// True when `bearing` lies within `half_angle` of `target` on the shorter
/// arc. Inclusive at the edges.
pub fn within_sector(bearing: f64, target: f64, half_angle: f64) -> bool {
    angular_difference(bearing, target).abs() <= half_angle
}
