//! Menger curvature: the circumradius and turn direction of the
//! triangle formed by three ordered points, used as a point-wise
//! curvature estimate (spec.md §4.2).

use crate::geo::GeoPoint;
use crate::segment::CurveDirection;

/// Radius cap applied downstream to degenerate (infinite) circumradii.
/// Declared here so callers that need "the constant the analyzer caps
/// at" don't have to reach into the pipeline module.
pub const RADIUS_CAP_M: f64 = 10_000.0;

/// Converts three ordered points to a local planar `(x, y)` triangle
/// in meters, using the same equirectangular approximation as
/// [`crate::geo::project_point_onto_segment`].
fn to_local_xy(origin: GeoPoint, p: GeoPoint) -> (f64, f64) {
    let lat_to_m = 111_320.0;
    let lon_to_m = 111_320.0 * origin.lat.to_radians().cos();
    ((p.lon - origin.lon) * lon_to_m, (p.lat - origin.lat) * lat_to_m)
}

/// Circumradius of the triangle `(p1, p2, p3)`, in meters.
///
/// # Returns
/// `f64::INFINITY` for collinear or coincident triples — callers
/// apply [`RADIUS_CAP_M`] downstream rather than here, so this
/// function stays a pure geometric primitive.
pub fn menger_radius_m(p1: GeoPoint, p2: GeoPoint, p3: GeoPoint) -> f64 {
    let (x1, y1) = (0.0, 0.0);
    let (x2, y2) = to_local_xy(p1, p2);
    let (x3, y3) = to_local_xy(p1, p3);

    let a = haversine_like(x1, y1, x2, y2);
    let b = haversine_like(x2, y2, x3, y3);
    let c = haversine_like(x3, y3, x1, y1);

    // Twice the signed area via the shoelace formula.
    let cross = (x2 - x1) * (y3 - y1) - (x3 - x1) * (y2 - y1);
    let area = cross.abs() / 2.0;

    if area < 1e-9 {
        return f64::INFINITY;
    }

    (a * b * c) / (4.0 * area)
}

fn haversine_like(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

/// Sign of the z-component of `(p2 - p1) x (p3 - p2)` in the local
/// tangent plane: positive is a left turn, negative is right, zero is
/// collinear (undefined direction).
pub fn turn_direction(p1: GeoPoint, p2: GeoPoint, p3: GeoPoint) -> Option<CurveDirection> {
    let (x1, y1) = (0.0, 0.0);
    let (x2, y2) = to_local_xy(p1, p2);
    let (x3, y3) = to_local_xy(p1, p3);

    let v1x = x2 - x1;
    let v1y = y2 - y1;
    let v2x = x3 - x2;
    let v2y = y3 - y2;

    let cross = v1x * v2y - v1y * v2x;

    if cross > 1e-9 {
        Some(CurveDirection::Left)
    } else if cross < -1e-9 {
        Some(CurveDirection::Right)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points_give_infinite_radius() {
        let p1 = GeoPoint::new(0.0, 0.0);
        let p2 = GeoPoint::new(0.0, 0.001);
        let p3 = GeoPoint::new(0.0, 0.002);
        assert_eq!(menger_radius_m(p1, p2, p3), f64::INFINITY);
        assert_eq!(turn_direction(p1, p2, p3), None);
    }

    #[test]
    fn coincident_points_give_infinite_radius() {
        let p = GeoPoint::new(1.0, 1.0);
        assert_eq!(menger_radius_m(p, p, p), f64::INFINITY);
    }

    #[test]
    fn left_turn_detected() {
        // A counter-clockwise (left) turn in local ENU-ish coords.
        let p1 = GeoPoint::new(0.0, 0.0);
        let p2 = GeoPoint::new(0.0, 0.001);
        let p3 = GeoPoint::new(0.001, 0.001);
        assert_eq!(turn_direction(p1, p2, p3), Some(CurveDirection::Left));
    }

    #[test]
    fn right_turn_detected() {
        let p1 = GeoPoint::new(0.0, 0.0);
        let p2 = GeoPoint::new(0.0, 0.001);
        let p3 = GeoPoint::new(-0.001, 0.001);
        assert_eq!(turn_direction(p1, p2, p3), Some(CurveDirection::Right));
    }

    #[test]
    fn known_right_triangle_radius() {
        // A 90-degree turn with 100m legs: circumradius of a right
        // triangle is half the hypotenuse.
        let p1 = GeoPoint::new(0.0, 0.0);
        let p2 = GeoPoint::new(0.0, 100.0 / 111_320.0);
        let p3 = GeoPoint::new(100.0 / 111_320.0, 100.0 / 111_320.0);
        let r = menger_radius_m(p1, p2, p3);
        let expected = (100_f64.powi(2) * 2.0).sqrt() / 2.0;
        assert!((r - expected).abs() < 1.0, "got {r}, expected {expected}");
    }
}
