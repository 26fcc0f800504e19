//! Route segment data model (spec.md §3): the tagged union of curve
//! and straight segments the analyzer produces, plus the small enums
//! that describe a curve's shape.

pub mod classifier;
pub mod compound;
pub mod quality;
pub mod segmenter;
pub mod speed_lean;

pub use classifier::classify_curve;
pub use compound::detect_compounds;
pub use quality::{apply_confidence, find_sparse_regions, SparseRegion};
pub use segmenter::segment_raw_runs;
pub use speed_lean::{advisory_speed_ms, lean_angle_deg, LeanAngle};

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveDirection {
    Left,
    Right,
}

/// Curve severity, ordered `Gentle < Moderate < Firm < Sharp <
/// Hairpin`. The ordering is load-bearing: the scheduler's preemption
/// rule (spec.md §4.14) compares severities directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Gentle,
    Moderate,
    Firm,
    Sharp,
    Hairpin,
}

impl Severity {
    /// Classifies a minimum radius into a severity band via
    /// strict-greater-than thresholds (spec.md §4.6).
    pub fn classify(min_radius_m: f64, thresholds: &crate::config::SeverityThresholds) -> Self {
        if min_radius_m > thresholds.gentle {
            Severity::Gentle
        } else if min_radius_m > thresholds.moderate {
            Severity::Moderate
        } else if min_radius_m > thresholds.firm {
            Severity::Firm
        } else if min_radius_m > thresholds.sharp {
            Severity::Sharp
        } else {
            Severity::Hairpin
        }
    }

    /// Scheduler priority number (spec.md §4.14): higher preempts
    /// lower.
    pub fn priority(self) -> u8 {
        match self {
            Severity::Hairpin => 7,
            Severity::Sharp => 6,
            Severity::Firm => 5,
            Severity::Moderate => 4,
            Severity::Gentle => 3,
        }
    }
}

/// Which of the four shape modifiers apply to a curve. `Tightening`
/// and `Opening` are mutually exclusive; `Holds` requires `Long` and
/// the absence of both (spec.md §3 invariant 4). The constructor is
/// the only way to build one, so the exclusivity invariant cannot be
/// violated by a caller setting fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurveModifiers {
    tightening: bool,
    opening: bool,
    holds: bool,
    long: bool,
}

impl CurveModifiers {
    /// Builds a modifier set from the classifier's independent
    /// tightening/opening/long booleans, deriving `holds` per the
    /// invariant rather than taking it as an input.
    pub fn new(tightening: bool, opening: bool, long: bool) -> Self {
        debug_assert!(
            !(tightening && opening),
            "tightening and opening are mutually exclusive"
        );
        let holds = long && !tightening && !opening;
        Self {
            tightening,
            opening,
            holds,
            long,
        }
    }

    pub fn tightening(&self) -> bool {
        self.tightening
    }
    pub fn opening(&self) -> bool {
        self.opening
    }
    pub fn holds(&self) -> bool {
        self.holds
    }
    pub fn long(&self) -> bool {
        self.long
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundType {
    SBend,
    Chicane,
    Series,
    TighteningSequence,
    Switchbacks,
}

/// A classified curve (spec.md §3). Immutable once produced by the
/// analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    pub direction: CurveDirection,
    pub severity: Severity,
    pub min_radius_m: f64,
    pub arc_length_m: f64,
    pub modifiers: CurveModifiers,
    pub total_angle_change_deg: f64,
    pub is_right_angle: bool,
    pub advisory_speed_ms: Option<f64>,
    pub lean_angle_deg: Option<LeanAngle>,
    pub compound_type: Option<CompoundType>,
    pub compound_size: Option<usize>,
    pub position_in_compound: Option<usize>,
    pub confidence: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub start_point: GeoPoint,
    pub end_point: GeoPoint,
    pub distance_from_start_m: f64,
}

impl CurveSegment {
    /// A stable identity for scheduler dedup purposes (spec.md §3
    /// invariant 6): two segments from the same analyzer run that
    /// cover the same index range are the same curve.
    pub fn identity(&self) -> (usize, usize) {
        (self.start_index, self.end_index)
    }
}

/// A straight segment (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightSegment {
    pub length_m: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub start_point: GeoPoint,
    pub end_point: GeoPoint,
    pub distance_from_start_m: f64,
}

/// The tagged union the analyzer produces, ordered along the route
/// with no gaps (spec.md §3 invariant 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RouteSegment {
    Curve(CurveSegment),
    Straight(StraightSegment),
}

impl RouteSegment {
    pub fn start_index(&self) -> usize {
        match self {
            RouteSegment::Curve(c) => c.start_index,
            RouteSegment::Straight(s) => s.start_index,
        }
    }

    pub fn end_index(&self) -> usize {
        match self {
            RouteSegment::Curve(c) => c.end_index,
            RouteSegment::Straight(s) => s.end_index,
        }
    }

    pub fn distance_from_start_m(&self) -> f64 {
        match self {
            RouteSegment::Curve(c) => c.distance_from_start_m,
            RouteSegment::Straight(s) => s.distance_from_start_m,
        }
    }

    pub fn length_m(&self) -> f64 {
        match self {
            RouteSegment::Curve(c) => c.arc_length_m,
            RouteSegment::Straight(s) => s.length_m,
        }
    }

    pub fn as_curve(&self) -> Option<&CurveSegment> {
        match self {
            RouteSegment::Curve(c) => Some(c),
            RouteSegment::Straight(_) => None,
        }
    }
}

/// An analyzer-internal run before classification: a contiguous index
/// range tagged as curve or straight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSegment {
    pub start_index: usize,
    pub end_index: usize,
    pub is_curve: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_matches_spec() {
        assert!(Severity::Gentle < Severity::Moderate);
        assert!(Severity::Moderate < Severity::Firm);
        assert!(Severity::Firm < Severity::Sharp);
        assert!(Severity::Sharp < Severity::Hairpin);
    }

    #[test]
    fn modifiers_derive_holds_from_long_and_exclusivity() {
        let holds = CurveModifiers::new(false, false, true);
        assert!(holds.holds());
        assert!(holds.long());
        assert!(!holds.tightening() && !holds.opening());

        let tightening_long = CurveModifiers::new(true, false, true);
        assert!(!tightening_long.holds());
        assert!(tightening_long.tightening());
    }

    #[test]
    fn severity_priority_matches_scheduler_table() {
        assert_eq!(Severity::Hairpin.priority(), 7);
        assert_eq!(Severity::Sharp.priority(), 6);
        assert_eq!(Severity::Firm.priority(), 5);
        assert_eq!(Severity::Moderate.priority(), 4);
        assert_eq!(Severity::Gentle.priority(), 3);
    }
}
