//! Great-circle geo primitives: distance, bearing, interpolation, and
//! segment projection. Pure functions over [`GeoPoint`]; undefined
//! behavior is specified explicitly per function rather than panicking.

use serde::{Deserialize, Serialize};

/// Mean Earth radius, meters. Matches the value spec.md §4.1 pins.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 geographic coordinate in degrees. Immutable, `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        GeoPoint::new(lat, lon)
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` to `b`, degrees in `[0, 360)`.
pub fn initial_bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    let theta = y.atan2(x).to_degrees();
    (theta + 360.0) % 360.0
}

/// Linear interpolation between `a` and `b` in the local tangent
/// plane, `t` clamped to `[0, 1]`. Acceptable approximation at the
/// ~10m spacing this crate resamples to (spec.md §4.1).
pub fn interpolate(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let t = t.clamp(0.0, 1.0);
    GeoPoint::new(a.lat + (b.lat - a.lat) * t, a.lon + (b.lon - a.lon) * t)
}

/// Bearing difference `b - a`, normalized to `(-180, 180]` degrees.
pub fn bearing_difference_deg(a_deg: f64, b_deg: f64) -> f64 {
    let mut diff = (b_deg - a_deg) % 360.0;
    if diff <= -180.0 {
        diff += 360.0;
    } else if diff > 180.0 {
        diff -= 360.0;
    }
    diff
}

/// Result of projecting a point onto a line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub snapped_point: GeoPoint,
    pub distance_m: f64,
    /// Projection parameter along (a, b), clamped to `[0, 1]`.
    pub t: f64,
}

/// Projects `p` perpendicularly onto segment `(a, b)`, clamping the
/// parameter to `[0, 1]`. For a zero-length segment, returns `a` with
/// distance `|p - a|` (spec.md §4.1).
///
/// Uses an equirectangular local-tangent-plane approximation — exact
/// at the resampled ~10m spacing this crate operates at, and cheap
/// enough to call per edge in the map matcher's windowed search.
pub fn project_point_onto_segment(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> Projection {
    let lat_to_m = 111_320.0;
    let lon_to_m = 111_320.0 * a.lat.to_radians().cos();

    let ax = 0.0;
    let ay = 0.0;
    let bx = (b.lon - a.lon) * lon_to_m;
    let by = (b.lat - a.lat) * lat_to_m;
    let px = (p.lon - a.lon) * lon_to_m;
    let py = (p.lat - a.lat) * lat_to_m;

    let abx = bx - ax;
    let aby = by - ay;
    let len_sq = abx * abx + aby * aby;

    if len_sq < 1e-9 {
        return Projection {
            snapped_point: a,
            distance_m: haversine_distance_m(p, a),
            t: 0.0,
        };
    }

    let apx = px - ax;
    let apy = py - ay;
    let t_raw = (apx * abx + apy * aby) / len_sq;
    let t = t_raw.clamp(0.0, 1.0);

    let snapped_point = interpolate(a, b, t);
    let distance_m = haversine_distance_m(p, snapped_point);

    Projection {
        snapped_point,
        distance_m,
        t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // Roughly one degree of latitude.
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = haversine_distance_m(a, b);
        assert!((d - 111_195.0).abs() < 200.0, "got {d}");
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        let a = GeoPoint::new(37.77, -122.42);
        assert_eq!(haversine_distance_m(a, a), 0.0);
    }

    #[test]
    fn bearing_due_north() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let bearing = initial_bearing_deg(a, b);
        assert!(bearing.abs() < 1e-6 || (bearing - 360.0).abs() < 1e-6);
    }

    #[test]
    fn bearing_due_east() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let bearing = initial_bearing_deg(a, b);
        assert!((bearing - 90.0).abs() < 1.0);
    }

    #[test]
    fn bearing_difference_normalizes() {
        assert!((bearing_difference_deg(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((bearing_difference_deg(10.0, 350.0) + 20.0).abs() < 1e-9);
        assert_eq!(bearing_difference_deg(0.0, 180.0), 180.0);
    }

    #[test]
    fn interpolate_midpoint() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(2.0, 4.0);
        let m = interpolate(a, b, 0.5);
        assert!((m.lat - 1.0).abs() < 1e-9);
        assert!((m.lon - 2.0).abs() < 1e-9);
    }

    #[test]
    fn interpolate_clamps_t() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);
        assert_eq!(interpolate(a, b, -5.0), a);
        assert_eq!(interpolate(a, b, 5.0), b);
    }

    #[test]
    fn project_onto_segment_midpoint() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.01);
        let p = GeoPoint::new(0.001, 0.005);
        let proj = project_point_onto_segment(p, a, b);
        assert!((proj.t - 0.5).abs() < 0.05);
        assert!(proj.distance_m > 0.0 && proj.distance_m < 200.0);
    }

    #[test]
    fn project_clamps_beyond_endpoint() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.01);
        let p = GeoPoint::new(0.0, 0.02);
        let proj = project_point_onto_segment(p, a, b);
        assert_eq!(proj.t, 1.0);
        assert_eq!(proj.snapped_point, b);
    }

    #[test]
    fn project_degenerate_segment_returns_a() {
        let a = GeoPoint::new(10.0, 10.0);
        let p = GeoPoint::new(10.001, 10.0);
        let proj = project_point_onto_segment(p, a, a);
        assert_eq!(proj.snapped_point, a);
        assert_eq!(proj.t, 0.0);
        assert!((proj.distance_m - haversine_distance_m(p, a)).abs() < 1e-6);
    }
}
