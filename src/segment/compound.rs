//! Compound curve pattern detection (spec.md §4.8): switchbacks,
//! chicanes, S-bends, series, and tightening sequences.
//!
//! Runs as four fixed-order claiming passes over the route's curves.
//! Earlier passes claim the more specific patterns first so a later,
//! broader pass never steals curves a tighter pattern already
//! explains.

use crate::config::AnalysisConfig;
use crate::segment::{CompoundType, CurveDirection, RouteSegment, Severity};

/// Fixed gap bound for switchback runs (spec.md §4.8 step 2: "each gap
/// is < 200 m"). Not tied to `AnalysisConfig::straight_gap_merge_m`,
/// which the other three passes use instead.
const SWITCHBACK_GAP_M: f64 = 200.0;

/// Walks `segments` in route order and tags each curve's
/// `compound_type`/`compound_size`/`position_in_compound` fields.
/// Curves with no compound are left at `None`.
///
/// Runs the four passes in the fixed order spec.md §4.8 mandates —
/// S-bend/chicane first (the safety-critical, most specific pattern),
/// then switchbacks, then series, then tightening sequences — each
/// pass skipping curves an earlier pass already claimed.
pub fn detect_compounds(segments: &mut [RouteSegment], config: &AnalysisConfig) {
    let curve_indices: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter_map(|(i, s)| matches!(s, RouteSegment::Curve(_)).then_some(i))
        .collect();

    if curve_indices.len() < 2 {
        return;
    }

    let gaps = gaps_between(segments, &curve_indices);

    let mut claimed = vec![false; curve_indices.len()];

    claim_sbend_or_chicane(segments, &curve_indices, &gaps, &mut claimed, config.straight_gap_merge_m);
    claim_switchbacks(segments, &curve_indices, &gaps, &mut claimed);
    claim_series(segments, &curve_indices, &gaps, &mut claimed, config.straight_gap_merge_m);
    claim_tightening_sequence(segments, &curve_indices, &gaps, &mut claimed, config.straight_gap_merge_m);
}

/// `gaps[k]` is the straight distance between curve `k` and curve
/// `k + 1` (the sum of every non-curve segment's length between
/// them — ordinarily exactly one straight).
fn gaps_between(segments: &[RouteSegment], curve_indices: &[usize]) -> Vec<f64> {
    curve_indices
        .windows(2)
        .map(|w| {
            segments[w[0] + 1..w[1]]
                .iter()
                .map(|s| s.length_m())
                .sum()
        })
        .collect()
}

fn curve_direction(segments: &[RouteSegment], idx: usize) -> CurveDirection {
    segments[idx].as_curve().unwrap().direction
}

fn curve_severity(segments: &[RouteSegment], idx: usize) -> Severity {
    segments[idx].as_curve().unwrap().severity
}

fn curve_min_radius(segments: &[RouteSegment], idx: usize) -> f64 {
    segments[idx].as_curve().unwrap().min_radius_m
}

/// `position` is 1-indexed per spec.md §3 invariant 5 ("SWITCHBACK
/// positions are a contiguous `1..compound_size`"); applied uniformly
/// to every compound type for consistency.
fn tag(segments: &mut [RouteSegment], seg_idx: usize, kind: CompoundType, size: usize, position: usize) {
    if let RouteSegment::Curve(c) = &mut segments[seg_idx] {
        c.compound_type = Some(kind);
        c.compound_size = Some(size);
        c.position_in_compound = Some(position);
    }
}

/// Adjacent unclaimed pairs of opposite-direction curves with a short
/// gap: `Chicane` if both Sharp or Hairpin (a tight, abrupt direction
/// reversal), `SBend` otherwise (a gentler weave). Runs first among the four
/// passes (spec.md §4.8 step 1).
fn claim_sbend_or_chicane(
    segments: &mut [RouteSegment],
    curve_indices: &[usize],
    gaps: &[f64],
    claimed: &mut [bool],
    gap_threshold_m: f64,
) {
    let n = curve_indices.len();
    let mut k = 0;
    while k + 1 < n {
        if claimed[k] || claimed[k + 1] || gaps[k] >= gap_threshold_m {
            k += 1;
            continue;
        }
        let a = curve_indices[k];
        let b = curve_indices[k + 1];
        if curve_direction(segments, a) == curve_direction(segments, b) {
            k += 1;
            continue;
        }
        let kind = if curve_severity(segments, a) >= Severity::Sharp && curve_severity(segments, b) >= Severity::Sharp {
            CompoundType::Chicane
        } else {
            CompoundType::SBend
        };
        claimed[k] = true;
        claimed[k + 1] = true;
        tag(segments, a, kind, 2, 1);
        tag(segments, b, kind, 2, 2);
        k += 2;
    }
}

/// Maximal unclaimed runs of 3+ curves, alternating direction, each
/// Sharp or tighter, with gaps under 200m throughout (spec.md §4.8
/// step 2).
fn claim_switchbacks(
    segments: &mut [RouteSegment],
    curve_indices: &[usize],
    gaps: &[f64],
    claimed: &mut [bool],
) {
    let n = curve_indices.len();
    let mut k = 0;
    while k < n {
        if claimed[k] || curve_severity(segments, curve_indices[k]) < Severity::Sharp {
            k += 1;
            continue;
        }
        let mut end = k;
        while end + 1 < n
            && !claimed[end + 1]
            && gaps[end] < SWITCHBACK_GAP_M
            && curve_severity(segments, curve_indices[end + 1]) >= Severity::Sharp
            && curve_direction(segments, curve_indices[end + 1]) != curve_direction(segments, curve_indices[end])
        {
            end += 1;
        }
        let run_len = end - k + 1;
        if run_len >= 3 {
            for (offset, i) in (k..=end).enumerate() {
                claimed[i] = true;
                tag(segments, curve_indices[i], CompoundType::Switchbacks, run_len, offset + 1);
            }
            k = end + 1;
        } else {
            k += 1;
        }
    }
}

/// Maximal unclaimed runs of 3+ same-direction curves with short gaps
/// (spec.md §4.8 step 3).
fn claim_series(
    segments: &mut [RouteSegment],
    curve_indices: &[usize],
    gaps: &[f64],
    claimed: &mut [bool],
    gap_threshold_m: f64,
) {
    let n = curve_indices.len();
    let mut k = 0;
    while k < n {
        if claimed[k] {
            k += 1;
            continue;
        }
        let mut end = k;
        while end + 1 < n
            && !claimed[end + 1]
            && gaps[end] < gap_threshold_m
            && curve_direction(segments, curve_indices[end + 1]) == curve_direction(segments, curve_indices[end])
        {
            end += 1;
        }
        let run_len = end - k + 1;
        if run_len >= 3 {
            for (offset, i) in (k..=end).enumerate() {
                claimed[i] = true;
                tag(segments, curve_indices[i], CompoundType::Series, run_len, offset + 1);
            }
            k = end + 1;
        } else {
            k += 1;
        }
    }
}

/// Maximal unclaimed runs of 2+ same-direction curves with short gaps
/// and strictly decreasing minimum radius across the run (spec.md
/// §4.8 step 4).
fn claim_tightening_sequence(
    segments: &mut [RouteSegment],
    curve_indices: &[usize],
    gaps: &[f64],
    claimed: &mut [bool],
    gap_threshold_m: f64,
) {
    let n = curve_indices.len();
    let mut k = 0;
    while k < n {
        if claimed[k] {
            k += 1;
            continue;
        }
        let mut end = k;
        while end + 1 < n
            && !claimed[end + 1]
            && gaps[end] < gap_threshold_m
            && curve_direction(segments, curve_indices[end + 1]) == curve_direction(segments, curve_indices[end])
            && curve_min_radius(segments, curve_indices[end + 1]) < curve_min_radius(segments, curve_indices[end])
        {
            end += 1;
        }
        let run_len = end - k + 1;
        if run_len >= 2 {
            for (offset, i) in (k..=end).enumerate() {
                claimed[i] = true;
                tag(segments, curve_indices[i], CompoundType::TighteningSequence, run_len, offset + 1);
            }
            k = end + 1;
        } else {
            k += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{CurveModifiers, StraightSegment};
    use crate::geo::GeoPoint;

    fn curve(direction: CurveDirection, severity: Severity, min_radius_m: f64) -> RouteSegment {
        RouteSegment::Curve(crate::segment::CurveSegment {
            direction,
            severity,
            min_radius_m,
            arc_length_m: 50.0,
            modifiers: CurveModifiers::default(),
            total_angle_change_deg: 45.0,
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
            distance_from_start_m: 0.0,
        })
    }

    fn straight(length_m: f64) -> RouteSegment {
        RouteSegment::Straight(StraightSegment {
            length_m,
            start_index: 0,
            end_index: 1,
            start_point: GeoPoint::new(0.0, 0.0),
            end_point: GeoPoint::new(0.0, 0.0),
            distance_from_start_m: 0.0,
        })
    }

    #[test]
    fn chicane_detected_for_two_tight_opposite_curves() {
        let mut segments = vec![
            curve(CurveDirection::Left, Severity::Sharp, 30.0),
            straight(20.0),
            curve(CurveDirection::Right, Severity::Sharp, 30.0),
        ];
        detect_compounds(&mut segments, &AnalysisConfig::default());
        let a = segments[0].as_curve().unwrap();
        let b = segments[2].as_curve().unwrap();
        assert_eq!(a.compound_type, Some(CompoundType::Chicane));
        assert_eq!(b.compound_type, Some(CompoundType::Chicane));
        assert_eq!(a.compound_size, Some(2));
    }

    #[test]
    fn sbend_detected_for_two_gentle_opposite_curves() {
        let mut segments = vec![
            curve(CurveDirection::Left, Severity::Gentle, 300.0),
            straight(30.0),
            curve(CurveDirection::Right, Severity::Gentle, 300.0),
        ];
        detect_compounds(&mut segments, &AnalysisConfig::default());
        assert_eq!(segments[0].as_curve().unwrap().compound_type, Some(CompoundType::SBend));
    }

    #[test]
    fn switchbacks_detected_for_three_plus_alternating_firm_curves() {
        let mut segments = vec![
            curve(CurveDirection::Left, Severity::Sharp, 25.0),
            straight(10.0),
            curve(CurveDirection::Right, Severity::Sharp, 25.0),
            straight(10.0),
            curve(CurveDirection::Left, Severity::Sharp, 40.0),
        ];
        detect_compounds(&mut segments, &AnalysisConfig::default());
        for i in [0, 2, 4] {
            let c = segments[i].as_curve().unwrap();
            assert_eq!(c.compound_type, Some(CompoundType::Switchbacks));
            assert_eq!(c.compound_size, Some(3));
        }
    }

    #[test]
    fn series_detected_for_three_same_direction_curves() {
        let mut segments = vec![
            curve(CurveDirection::Left, Severity::Moderate, 80.0),
            straight(30.0),
            curve(CurveDirection::Left, Severity::Moderate, 90.0),
            straight(30.0),
            curve(CurveDirection::Left, Severity::Moderate, 85.0),
        ];
        detect_compounds(&mut segments, &AnalysisConfig::default());
        for i in [0, 2, 4] {
            assert_eq!(segments[i].as_curve().unwrap().compound_type, Some(CompoundType::Series));
        }
    }

    #[test]
    fn tightening_sequence_detected_for_decreasing_radius_run() {
        let mut segments = vec![
            curve(CurveDirection::Right, Severity::Gentle, 300.0),
            straight(30.0),
            curve(CurveDirection::Right, Severity::Moderate, 150.0),
            straight(30.0),
            curve(CurveDirection::Right, Severity::Firm, 60.0),
        ];
        detect_compounds(&mut segments, &AnalysisConfig::default());
        for i in [0, 2, 4] {
            assert_eq!(
                segments[i].as_curve().unwrap().compound_type,
                Some(CompoundType::TighteningSequence)
            );
        }
        assert_eq!(segments[4].as_curve().unwrap().position_in_compound, Some(3));
    }

    #[test]
    fn isolated_curve_gets_no_compound() {
        let mut segments = vec![
            straight(500.0),
            curve(CurveDirection::Left, Severity::Moderate, 100.0),
            straight(500.0),
        ];
        detect_compounds(&mut segments, &AnalysisConfig::default());
        assert_eq!(segments[1].as_curve().unwrap().compound_type, None);
    }

    #[test]
    fn wide_gap_prevents_grouping() {
        let mut segments = vec![
            curve(CurveDirection::Left, Severity::Sharp, 30.0),
            straight(500.0),
            curve(CurveDirection::Right, Severity::Sharp, 30.0),
        ];
        detect_compounds(&mut segments, &AnalysisConfig::default());
        assert_eq!(segments[0].as_curve().unwrap().compound_type, None);
        assert_eq!(segments[2].as_curve().unwrap().compound_type, None);
    }
}
