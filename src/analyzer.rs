//! The offline analysis orchestrator (spec.md §4.10): resample, derive
//! curvature, segment, classify, attach speed/lean, detect compounds,
//! and score confidence, in that fixed order.

use crate::config::AnalysisConfig;
use crate::curvature::{compute_curvature_points, resample, CurvaturePoint};
use crate::error::AnalyzeError;
use crate::geo::{haversine_distance_m, GeoPoint};
use crate::segment::{
    advisory_speed_ms, apply_confidence, classify_curve, detect_compounds, find_sparse_regions,
    lean_angle_deg, segment_raw_runs, RawSegment, RouteSegment, Severity, SparseRegion, StraightSegment,
};

/// The full output of one analysis run: an ordered, gapless sequence
/// of curve and straight segments covering the whole route, the
/// resampled polyline the segments' indices refer to, any sparse
/// (widely-gapped) stretches of the original input, and the route's
/// total length.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisOutput {
    pub segments: Vec<RouteSegment>,
    pub interpolated_points: Vec<GeoPoint>,
    pub sparse_regions: Vec<SparseRegion>,
    pub total_distance_m: f64,
    pub point_count: usize,
}

/// Analyzes a route's points into a sequence of classified curves and
/// straights.
///
/// # Arguments
/// `points` must have at least 3 entries, each a finite, in-range
/// coordinate. `config` must pass [`AnalysisConfig::validate`].
///
/// # Returns
/// An [`AnalysisOutput`] whose segments partition `[0, resampled.len()
/// - 1]` with no gaps or overlap (spec.md §8 property 1).
///
/// # Errors
/// [`AnalyzeError::InvalidConfig`] if `config` fails validation,
/// [`AnalyzeError::InvalidPoint`] if any input point is non-finite or
/// out of range, [`AnalyzeError::RouteTooShort`] if fewer than 3
/// points remain either before or after resampling.
pub fn analyze(points: &[GeoPoint], config: &AnalysisConfig) -> Result<AnalysisOutput, AnalyzeError> {
    config.validate()?;

    if points.len() < 3 {
        return Err(AnalyzeError::RouteTooShort);
    }
    for (index, point) in points.iter().enumerate() {
        if !point.is_finite() {
            return Err(AnalyzeError::InvalidPoint {
                index,
                reason: "latitude or longitude is NaN or infinite",
            });
        }
        if !point.is_in_range() {
            return Err(AnalyzeError::InvalidPoint {
                index,
                reason: "latitude or longitude outside valid range",
            });
        }
    }

    let resampled = resample(points, config.resample_spacing_m);
    if resampled.len() < 3 {
        return Err(AnalyzeError::RouteTooShort);
    }
    log::debug!("resampled {} input points to {}", points.len(), resampled.len());

    let curvature_points = compute_curvature_points(&resampled, config.smoothing_window);
    let raw_runs = segment_raw_runs(&curvature_points, config);
    log::debug!(
        "segmented into {} raw runs ({} curves)",
        raw_runs.len(),
        raw_runs.iter().filter(|r| r.is_curve).count()
    );
    let cumulative_distance_m = cumulative_distances(&curvature_points);

    let mut segments: Vec<RouteSegment> = raw_runs
        .iter()
        .map(|run| build_segment(run, &curvature_points, &cumulative_distance_m, config))
        .collect();

    detect_compounds(&mut segments, config);

    let sparse_regions = find_sparse_regions(points, config.sparse_node_threshold_m);
    apply_confidence(&mut segments, &sparse_regions);

    Ok(AnalysisOutput {
        total_distance_m: *cumulative_distance_m.last().unwrap_or(&0.0),
        point_count: resampled.len(),
        segments,
        interpolated_points: resampled,
        sparse_regions,
    })
}

/// `result[i]` is the cumulative path distance from `points[0]` to
/// `points[i]`.
fn cumulative_distances(points: &[CurvaturePoint]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for window in points.windows(2) {
        total += haversine_distance_m(window[0].point, window[1].point);
        cumulative.push(total);
    }
    cumulative
}

fn build_segment(
    run: &RawSegment,
    curvature_points: &[CurvaturePoint],
    cumulative_distance_m: &[f64],
    config: &AnalysisConfig,
) -> RouteSegment {
    let distance_from_start_m = cumulative_distance_m[run.start_index];

    if run.is_curve {
        let mut curve = classify_curve(run, curvature_points, config, distance_from_start_m);
        let advisory = advisory_speed_ms(curve.min_radius_m, config);
        // spec.md §4.7: Firm/Sharp/Hairpin always get an advisory;
        // Moderate only if the speed is under the (km/h-fixed,
        // display-unit-independent) 70 km/h band; Gentle never does.
        const MODERATE_THRESHOLD_MS: f64 = 70.0 / 3.6;
        let attach_advisory = match curve.severity {
            Severity::Firm | Severity::Sharp | Severity::Hairpin => true,
            Severity::Moderate => advisory < MODERATE_THRESHOLD_MS,
            Severity::Gentle => false,
        };
        if attach_advisory {
            curve.advisory_speed_ms = Some(advisory);
            if config.is_motorcycle_mode {
                curve.lean_angle_deg = Some(lean_angle_deg(advisory, curve.min_radius_m));
            }
        }
        RouteSegment::Curve(curve)
    } else {
        let length_m =
            cumulative_distance_m[run.end_index] - cumulative_distance_m[run.start_index];
        RouteSegment::Straight(StraightSegment {
            length_m,
            start_index: run.start_index,
            end_index: run.end_index,
            start_point: curvature_points[run.start_index].point,
            end_point: curvature_points[run.end_index].point,
            distance_from_start_m,
        })
    }
}
