//! Curve classification: direction, severity, arc length, shape
//! modifiers, total angle change, and the right-angle flag (spec.md
//! §4.6).

use crate::config::AnalysisConfig;
use crate::curvature::{CurvaturePoint, RADIUS_CAP_M};
use crate::geo::{bearing_difference_deg, haversine_distance_m, initial_bearing_deg};
use crate::segment::{CurveDirection, CurveModifiers, CurveSegment, RawSegment, Severity};

/// Classifies one curve raw segment, leaving the fields later passes
/// own (`advisory_speed_ms`, `lean_angle_deg`, `compound_type`,
/// `compound_size`, `position_in_compound`, `confidence`) at their
/// defaults — [`crate::segment::speed_lean`], [`crate::segment::compound`],
/// and [`crate::segment::quality`] fill those in.
pub fn classify_curve(
    raw: &RawSegment,
    curvature_points: &[CurvaturePoint],
    config: &AnalysisConfig,
    distance_from_start_m: f64,
) -> CurveSegment {
    let run = &curvature_points[raw.start_index..=raw.end_index];

    let direction = majority_direction(run);
    let min_radius_m = run
        .iter()
        .map(|p| p.smoothed_radius_m)
        .fold(f64::INFINITY, f64::min);
    let severity = Severity::classify(min_radius_m, &config.severity_thresholds);
    let arc_length_m = run
        .windows(2)
        .map(|w| haversine_distance_m(w[0].point, w[1].point))
        .sum();

    let modifiers = classify_modifiers(run, arc_length_m);
    let total_angle_change_deg = total_angle_change(run);
    let is_right_angle = (85.0..=95.0).contains(&total_angle_change_deg.abs()) && arc_length_m < 50.0;

    CurveSegment {
        direction,
        severity,
        min_radius_m,
        arc_length_m,
        modifiers,
        total_angle_change_deg,
        is_right_angle,
        advisory_speed_ms: None,
        lean_angle_deg: None,
        compound_type: None,
        compound_size: None,
        position_in_compound: None,
        confidence: 1.0,
        start_index: raw.start_index,
        end_index: raw.end_index,
        start_point: run.first().unwrap().point,
        end_point: run.last().unwrap().point,
        distance_from_start_m,
    }
}

/// Majority of the per-point signed directions in the range; ties
/// break `Left` (spec.md §4.6).
fn majority_direction(run: &[CurvaturePoint]) -> CurveDirection {
    let mut left = 0usize;
    let mut right = 0usize;
    for p in run {
        match p.direction {
            Some(CurveDirection::Left) => left += 1,
            Some(CurveDirection::Right) => right += 1,
            None => {}
        }
    }
    if right > left {
        CurveDirection::Right
    } else {
        CurveDirection::Left
    }
}

/// Splits the run into three equal thirds (when each has >= 1 point)
/// and compares the average capped-smoothed-radius of the first and
/// last third to classify tightening/opening/long/holds.
fn classify_modifiers(run: &[CurvaturePoint], arc_length_m: f64) -> CurveModifiers {
    let long = arc_length_m > 200.0;

    if run.len() < 3 {
        return CurveModifiers::new(false, false, long);
    }

    let third = run.len() / 3;
    if third == 0 {
        return CurveModifiers::new(false, false, long);
    }

    let first_third = &run[0..third];
    let last_third = &run[run.len() - third..];

    let avg_capped = |slice: &[CurvaturePoint]| -> f64 {
        slice.iter().map(|p| p.smoothed_radius_m.min(RADIUS_CAP_M)).sum::<f64>() / slice.len() as f64
    };

    let avg_first = avg_capped(first_third);
    let avg_last = avg_capped(last_third);

    let tightening = avg_last < 0.8 * avg_first;
    let opening = avg_last > 1.2 * avg_first;

    CurveModifiers::new(tightening, opening, long)
}

/// Absolute bearing difference between the entry bearing (first two
/// points) and the exit bearing (last two points) of the run.
fn total_angle_change(run: &[CurvaturePoint]) -> f64 {
    if run.len() < 2 {
        return 0.0;
    }
    let entry_bearing = initial_bearing_deg(run[0].point, run[1].point);
    let exit_bearing = initial_bearing_deg(run[run.len() - 2].point, run[run.len() - 1].point);
    bearing_difference_deg(entry_bearing, exit_bearing).abs()
}
