//! Raw segmentation: curve/straight run-length encoding plus the
//! short-straight merge pass (spec.md §4.5).

use crate::config::AnalysisConfig;
use crate::curvature::CurvaturePoint;
use crate::geo::haversine_distance_m;
use crate::segment::RawSegment;

/// Marks each point `in_curve` iff its smoothed radius is below
/// `config.curvature_threshold_radius_m`, run-length encodes into raw
/// segments, then fuses any straight run shorter than
/// `config.straight_gap_merge_m` that is flanked by curves on both
/// sides into a single curve run.
///
/// Preserves the coverage invariant: the returned runs partition
/// `[0, points.len() - 1]` contiguously with no gaps or overlap
/// (spec.md §8 property 1).
pub fn segment_raw_runs(points: &[CurvaturePoint], config: &AnalysisConfig) -> Vec<RawSegment> {
    if points.is_empty() {
        return Vec::new();
    }

    let in_curve: Vec<bool> = points
        .iter()
        .map(|p| p.smoothed_radius_m < config.curvature_threshold_radius_m)
        .collect();

    let mut runs = run_length_encode(&in_curve);
    merge_short_straights(&mut runs, points, config.straight_gap_merge_m);
    runs
}

fn run_length_encode(in_curve: &[bool]) -> Vec<RawSegment> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=in_curve.len() {
        if i == in_curve.len() || in_curve[i] != in_curve[start] {
            runs.push(RawSegment {
                start_index: start,
                end_index: i - 1,
                is_curve: in_curve[start],
            });
            start = i;
        }
    }
    runs
}

fn run_length_m(points: &[CurvaturePoint], run: &RawSegment) -> f64 {
    points[run.start_index..=run.end_index]
        .windows(2)
        .map(|w| haversine_distance_m(w[0].point, w[1].point))
        .sum()
}

/// Repeatedly fuses short straight runs flanked by curves on both
/// sides into one merged curve run, until no more merges apply.
fn merge_short_straights(runs: &mut Vec<RawSegment>, points: &[CurvaturePoint], merge_threshold_m: f64) {
    loop {
        let mut merged_any = false;
        let mut i = 0;
        while i < runs.len() {
            let is_mergeable_straight = !runs[i].is_curve
                && i > 0
                && i + 1 < runs.len()
                && runs[i - 1].is_curve
                && runs[i + 1].is_curve
                && run_length_m(points, &runs[i]) < merge_threshold_m;

            if is_mergeable_straight {
                let fused = RawSegment {
                    start_index: runs[i - 1].start_index,
                    end_index: runs[i + 1].end_index,
                    is_curve: true,
                };
                runs.splice(i - 1..=i + 1, [fused]);
                merged_any = true;
                // Restart the scan from the fused run's position;
                // an adjacent merge may now have become eligible.
                i = i.saturating_sub(1);
            } else {
                i += 1;
            }
        }
        if !merged_any {
            break;
        }
    }
}
