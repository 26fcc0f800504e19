//! Per-point curvature estimation with outlier repair and rolling
//! smoothing (spec.md §4.4).
//!
//! The outlier stage exists to tell genuine hairpin entry (two
//! adjacent small-radius points) apart from single-fix GPS jitter (one
//! small-radius point surrounded by straight neighbors) — skipping it
//! falsely fires hairpin alerts on noisy GPS traces.

use crate::curvature::menger::{self, RADIUS_CAP_M};
use crate::geo::GeoPoint;
use crate::segment::CurveDirection;

/// A single point's curvature estimate, produced by
/// [`compute_curvature_points`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvaturePoint {
    pub smoothed_radius_m: f64,
    pub raw_radius_m: f64,
    pub direction: Option<CurveDirection>,
    pub point: GeoPoint,
}

/// Runs the full curvature pipeline over a resampled polyline:
/// 1. raw Menger radius + direction per interior point (endpoints
///    inherit from their nearest interior neighbor),
/// 2. isolated-spike repair (radius spikes and position spikes),
/// 3. cap at [`RADIUS_CAP_M`],
/// 4. centered rolling mean with a window that shrinks near the
///    endpoints.
pub fn compute_curvature_points(points: &[GeoPoint], smoothing_window: usize) -> Vec<CurvaturePoint> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    if n < 3 {
        return points
            .iter()
            .map(|&point| CurvaturePoint {
                smoothed_radius_m: RADIUS_CAP_M,
                raw_radius_m: RADIUS_CAP_M,
                direction: None,
                point,
            })
            .collect();
    }

    let mut raw_radius = vec![0.0; n];
    let mut direction = vec![None; n];

    for i in 1..n - 1 {
        raw_radius[i] = menger::menger_radius_m(points[i - 1], points[i], points[i + 1]);
        direction[i] = menger::turn_direction(points[i - 1], points[i], points[i + 1]);
    }
    raw_radius[0] = raw_radius[1];
    direction[0] = direction[1];
    raw_radius[n - 1] = raw_radius[n - 2];
    direction[n - 1] = direction[n - 2];

    repair_outliers(points, &mut raw_radius);

    for r in raw_radius.iter_mut() {
        *r = r.min(RADIUS_CAP_M);
    }

    let smoothed = rolling_mean(&raw_radius, smoothing_window);

    (0..n)
        .map(|i| CurvaturePoint {
            smoothed_radius_m: smoothed[i],
            raw_radius_m: raw_radius[i],
            direction: direction[i],
            point: points[i],
        })
        .collect()
}

/// Replaces isolated radius spikes and position spikes with the
/// median radius of the four surrounding points (`i-2, i-1, i+1,
/// i+2`), for every point with at least two neighbors on each side.
fn repair_outliers(points: &[GeoPoint], raw_radius: &mut [f64]) {
    let n = raw_radius.len();
    if n < 5 {
        return;
    }

    let original = raw_radius.to_vec();
    for i in 2..n - 2 {
        let mut neighbors = [
            original[i - 2],
            original[i - 1],
            original[i + 1],
            original[i + 2],
        ];
        neighbors.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = (neighbors[1] + neighbors[2]) / 2.0;

        let is_radius_spike = original[i] < 0.2 * median
            && median > 100.0
            && original[i - 1] > 0.5 * median
            && original[i + 1] > 0.5 * median;

        let is_position_spike = position_spike_distance_m(points[i - 1], points[i], points[i + 1]) > 15.0;

        if is_radius_spike || is_position_spike {
            log::debug!(
                "repairing outlier at index {i}: raw={:.0}m replaced with neighbor median={median:.0}m",
                original[i]
            );
            raw_radius[i] = median;
        }
    }
}

/// Perpendicular distance of `mid` from the straight line `prev ->
/// next`, in meters — the "position spike" detector of spec.md §4.4.
fn position_spike_distance_m(prev: GeoPoint, mid: GeoPoint, next: GeoPoint) -> f64 {
    crate::geo::project_point_onto_segment(mid, prev, next).distance_m
}

/// Centered rolling mean of `values` with an odd `window`, shrinking
/// automatically near the endpoints (the window at index `i` is
/// `[i - k, i + k]` clipped to the array bounds, where `k =
/// window / 2`).
fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let k = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(k);
            let hi = (i + k).min(n - 1);
            let slice = &values[lo..=hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc_points(n: usize, radius_deg: f64) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| {
                let angle = std::f64::consts::PI * i as f64 / (n as f64 - 1.0);
                GeoPoint::new(radius_deg * angle.sin(), radius_deg * (1.0 - angle.cos()))
            })
            .collect()
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(compute_curvature_points(&[], 7).is_empty());
    }

    #[test]
    fn endpoints_inherit_neighbor_radius() {
        let points = arc_points(20, 0.01);
        let curvature = compute_curvature_points(&points, 7);
        assert_eq!(curvature[0].raw_radius_m, curvature[1].raw_radius_m);
        let last = curvature.len() - 1;
        assert_eq!(curvature[last].raw_radius_m, curvature[last - 1].raw_radius_m);
    }

    #[test]
    fn radii_capped_at_10000m() {
        // A near-straight line has near-infinite radius before capping.
        let points: Vec<GeoPoint> = (0..10).map(|i| GeoPoint::new(0.0, i as f64 * 0.0005)).collect();
        let curvature = compute_curvature_points(&points, 7);
        for cp in &curvature {
            assert!(cp.smoothed_radius_m <= RADIUS_CAP_M);
            assert!(cp.raw_radius_m <= RADIUS_CAP_M);
        }
    }

    #[test]
    fn single_point_gps_jitter_is_repaired() {
        // Straight line of points with one point nudged sideways by a
        // few meters: a single-fix position spike, not a real curve.
        let mut points: Vec<GeoPoint> = (0..11).map(|i| GeoPoint::new(0.0, i as f64 * 0.0001)).collect();
        let lat_to_m = 111_320.0;
        points[5].lat += 20.0 / lat_to_m; // ~20m lateral jitter, > 15m threshold

        let curvature = compute_curvature_points(&points, 7);
        // The jittered point's raw radius should have been replaced
        // by the (large) neighbor median, not reflect a tight curve.
        assert!(curvature[5].raw_radius_m > 500.0, "got {}", curvature[5].raw_radius_m);
    }

    #[test]
    fn genuine_hairpin_not_repaired_away() {
        // Two adjacent tight-radius points should survive outlier
        // repair (it is not a single-fix spike).
        let points = arc_points(30, 0.0003); // ~33m radius hairpin
        let curvature = compute_curvature_points(&points, 7);
        let min_radius = curvature
            .iter()
            .map(|cp| cp.smoothed_radius_m)
            .fold(f64::INFINITY, f64::min);
        assert!(min_radius < 200.0, "hairpin was smoothed away: {min_radius}");
    }

    #[test]
    fn rolling_mean_shrinks_at_edges() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let smoothed = rolling_mean(&values, 7);
        // Window of 7 fully clipped at edges still only averages
        // available neighbors, not padding with zeros.
        assert_eq!(smoothed[0], (1.0 + 2.0 + 3.0) / 3.0);
        assert_eq!(smoothed[4], (3.0 + 4.0 + 5.0) / 3.0);
    }

    #[test]
    fn idempotent_second_pass_matches_first() {
        let points = arc_points(25, 0.0008);
        let first = compute_curvature_points(&points, 7);
        let radii: Vec<f64> = first.iter().map(|cp| cp.smoothed_radius_m).collect();
        // Re-running curvature + repair + smoothing over the first
        // pass's own output (feeding the same points back through)
        // must be stable: the repair stage looks at raw radius, which
        // is recomputed from geometry, not from the previous pass's
        // smoothed output, so it reproduces identical results.
        let second = compute_curvature_points(&points, 7);
        let radii2: Vec<f64> = second.iter().map(|cp| cp.smoothed_radius_m).collect();
        assert_eq!(radii, radii2);
    }
}
