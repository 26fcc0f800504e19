//! Data-quality scoring for sparse GPS regions (spec.md §4.9): a
//! curve built from widely-spaced source fixes is less trustworthy
//! than one built from dense ones, because the resampler had to
//! interpolate across a gap instead of following a real measured path.

use crate::geo::{bearing_difference_deg, haversine_distance_m, initial_bearing_deg, GeoPoint};
use crate::segment::RouteSegment;

/// Local bearing change across a gap must exceed this for the gap to
/// count as sparse, even when its distance already exceeds the
/// threshold (spec.md §4.9) — a long but arrow-straight gap between
/// two source fixes is not actually under-resolved.
const SPARSE_BEARING_CHANGE_DEG: f64 = 10.0;

/// A stretch of the original (pre-resample) route where consecutive
/// source points were farther apart than the configured sparse
/// threshold, expressed as a distance-from-start range.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SparseRegion {
    pub start_m: f64,
    pub end_m: f64,
    pub gap_m: f64,
}

/// Scans the original (un-resampled) point sequence for consecutive
/// gaps wider than `threshold_m` whose local bearing change — computed
/// from the triples bracketing the gap — also exceeds
/// [`SPARSE_BEARING_CHANGE_DEG`] (spec.md §4.9). A wide but straight
/// gap (e.g. a long straight highway with sparse fixes) is not sparse
/// in the sense this crate cares about: it's only a data-quality risk
/// when the route might be curving across the gap and there aren't
/// enough fixes to tell.
pub fn find_sparse_regions(original_points: &[GeoPoint], threshold_m: f64) -> Vec<SparseRegion> {
    let mut regions = Vec::new();
    let mut cumulative_m = 0.0;
    let n = original_points.len();
    for (i, window) in original_points.windows(2).enumerate() {
        let gap_m = haversine_distance_m(window[0], window[1]);
        if gap_m > threshold_m && bearing_change_across_gap(original_points, i, n) > SPARSE_BEARING_CHANGE_DEG {
            regions.push(SparseRegion {
                start_m: cumulative_m,
                end_m: cumulative_m + gap_m,
                gap_m,
            });
        }
        cumulative_m += gap_m;
    }
    regions
}

/// Bearing change bracketing the gap between `points[i]` and
/// `points[i + 1]`: the bearing into the gap (from `points[i - 1]` to
/// `points[i]`) versus the bearing out of it (from `points[i + 1]` to
/// `points[i + 2]`). Falls back to whichever single bracket exists
/// near an endpoint, and to zero if neither does (a two-point route
/// has no bearing to compare).
fn bearing_change_across_gap(points: &[GeoPoint], i: usize, n: usize) -> f64 {
    let bearing_in = (i > 0).then(|| initial_bearing_deg(points[i - 1], points[i]));
    let bearing_out = (i + 2 < n).then(|| initial_bearing_deg(points[i + 1], points[i + 2]));
    match (bearing_in, bearing_out) {
        (Some(a), Some(b)) => bearing_difference_deg(a, b).abs(),
        _ => 0.0,
    }
}

/// Lowers each curve's `confidence` per the three-tier rule of spec.md
/// §4.9: a curve more than 80% overlapped by sparse region(s) drops to
/// `0.3`; any nonzero overlap drops it to `0.6`; no overlap leaves it
/// at `1.0`. Confidence is never raised — every curve starts at `1.0`
/// from the classifier, so this can only lower it.
pub fn apply_confidence(segments: &mut [RouteSegment], sparse_regions: &[SparseRegion]) {
    for segment in segments.iter_mut() {
        if let RouteSegment::Curve(curve) = segment {
            if curve.arc_length_m <= 0.0 {
                continue;
            }
            let curve_start = curve.distance_from_start_m;
            let curve_end = curve_start + curve.arc_length_m;

            let overlap_m: f64 = sparse_regions
                .iter()
                .map(|r| overlap_length(curve_start, curve_end, r.start_m, r.end_m))
                .sum();

            let overlap_fraction = (overlap_m / curve.arc_length_m).clamp(0.0, 1.0);
            if overlap_fraction > 0.8 {
                curve.confidence = 0.3;
            } else if overlap_fraction > 0.0 {
                curve.confidence = 0.6;
            }
        }
    }
}

fn overlap_length(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{CurveDirection, CurveModifiers, CurveSegment, Severity};

    fn curve_at(distance_from_start_m: f64, arc_length_m: f64) -> RouteSegment {
        RouteSegment::Curve(CurveSegment {
            direction: CurveDirection::Left,
            severity: Severity::Moderate,
            min_radius_m: 100.0,
            arc_length_m,
            modifiers: CurveModifiers::default(),
            total_angle_change_deg: 30.0,
            is_right_angle: false,
            advisory_speed_ms: None,
            lean_angle_deg: None,
            compound_type: None,
            compound_size: None,
            position_in_compound: None,
            confidence: 1.0,
            start_index: 0,
            end_index: 1,
            start_point: GeoPoint::new(0.0, 0.0),
            end_point: GeoPoint::new(0.0, 0.0),
            distance_from_start_m,
        })
    }

    #[test]
    fn no_gaps_gives_no_sparse_regions() {
        let points: Vec<GeoPoint> = (0..10).map(|i| GeoPoint::new(0.0, i as f64 * 0.0001)).collect();
        assert!(find_sparse_regions(&points, 100.0).is_empty());
    }

    #[test]
    fn wide_gap_with_bend_detected() {
        // A wide gap (~1113m, over the 100m threshold) bracketed by a
        // sharp turn on either side: the route direction changes a
        // lot across the gap, so the interpolated straight line across
        // it is untrustworthy.
        let points = vec![
            GeoPoint::new(-0.001, -0.0005),
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01), // the wide gap
            GeoPoint::new(-0.001, 0.0101),
        ];
        let regions = find_sparse_regions(&points, 100.0);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].gap_m > 100.0);
    }

    #[test]
    fn wide_but_straight_gap_is_not_sparse() {
        // Same wide gap, but the route runs dead straight through it —
        // no bearing change, so spec.md §4.9's second condition fails
        // and the gap is not flagged.
        let points: Vec<GeoPoint> = (0..4).map(|i| GeoPoint::new(0.0, i as f64 * 0.01)).collect();
        assert!(find_sparse_regions(&points, 100.0).is_empty());
    }

    #[test]
    fn curve_outside_sparse_region_keeps_full_confidence() {
        let mut segments = vec![curve_at(1000.0, 50.0)];
        let regions = vec![SparseRegion {
            start_m: 0.0,
            end_m: 200.0,
            gap_m: 200.0,
        }];
        apply_confidence(&mut segments, &regions);
        assert_eq!(segments[0].as_curve().unwrap().confidence, 1.0);
    }

    #[test]
    fn curve_mostly_inside_sparse_region_drops_to_floor() {
        // Overlap fraction (200/200 = 1.0) exceeds the 0.8 cutoff.
        let mut segments = vec![curve_at(50.0, 50.0)];
        let regions = vec![SparseRegion {
            start_m: 0.0,
            end_m: 200.0,
            gap_m: 200.0,
        }];
        apply_confidence(&mut segments, &regions);
        assert!((segments[0].as_curve().unwrap().confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn curve_partially_overlapping_sparse_region_gets_06() {
        // Overlap fraction (50/100 = 0.5) is nonzero but under the 0.8
        // cutoff, so the mid-tier 0.6 applies rather than a continuous
        // interpolation (spec.md §4.9's rule is a step function, not a
        // blend).
        let mut segments = vec![curve_at(0.0, 100.0)]; // covers [0, 100]
        let regions = vec![SparseRegion {
            start_m: 50.0,
            end_m: 150.0,
            gap_m: 100.0,
        }];
        apply_confidence(&mut segments, &regions);
        assert!((segments[0].as_curve().unwrap().confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn curve_barely_overlapping_sparse_region_still_gets_06_not_continuous() {
        // Overlap fraction (10/200 = 0.05) is small but nonzero: the
        // step function still drops all the way to 0.6, not a small
        // nudge proportional to the overlap.
        let mut segments = vec![curve_at(0.0, 200.0)];
        let regions = vec![SparseRegion {
            start_m: 190.0,
            end_m: 250.0,
            gap_m: 60.0,
        }];
        apply_confidence(&mut segments, &regions);
        assert!((segments[0].as_curve().unwrap().confidence - 0.6).abs() < 1e-9);
    }
}
