use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;

/// Severity threshold radii (meters), strict-greater-than boundaries.
///
/// `min_radius_m > gentle` is GENTLE, `> moderate` is MODERATE, and so
/// on down to HAIRPIN. See [`crate::segment::Severity::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub gentle: f64,
    pub moderate: f64,
    pub firm: f64,
    pub sharp: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            gentle: 200.0,
            moderate: 100.0,
            firm: 50.0,
            sharp: 25.0,
        }
    }
}

/// Tunables for the offline route analyzer (§3, §4.1-4.10 of the
/// design notes this crate implements).
///
/// Grouped into one constructible record the way the teacher groups
/// vehicle tunables into `physics::VehicleParams` — all thresholds
/// are explicit fields, nothing is an implicit global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Smoothed-radius threshold below which a point is `in_curve`.
    pub curvature_threshold_radius_m: f64,
    /// Straight runs shorter than this, flanked by curves, get fused
    /// into a single curve.
    pub straight_gap_merge_m: f64,
    pub severity_thresholds: SeverityThresholds,
    /// Original-point spacing above which a gap is considered sparse.
    pub sparse_node_threshold_m: f64,
    /// Lateral acceleration budget as a fraction of g (e.g. 0.35).
    pub lateral_g: f64,
    pub is_motorcycle_mode: bool,
    /// Rolling-mean window size for curvature smoothing; must be odd.
    pub smoothing_window: usize,
    /// Target spacing (meters) for the resampler.
    pub resample_spacing_m: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            curvature_threshold_radius_m: 500.0,
            straight_gap_merge_m: 50.0,
            severity_thresholds: SeverityThresholds::default(),
            sparse_node_threshold_m: 100.0,
            lateral_g: 0.35,
            is_motorcycle_mode: false,
            smoothing_window: 7,
            resample_spacing_m: 10.0,
        }
    }
}

impl AnalysisConfig {
    /// Sanity-checks this config. Mirrors the bounds the spec
    /// requires of every numeric field: positive spacings/thresholds,
    /// a strictly descending severity ladder, and an odd smoothing
    /// window.
    pub fn validate(&self) -> Result<(), AnalyzeError> {
        if self.curvature_threshold_radius_m <= 0.0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "curvature_threshold_radius_m must be positive",
            });
        }
        if self.straight_gap_merge_m <= 0.0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "straight_gap_merge_m must be positive",
            });
        }
        if self.sparse_node_threshold_m <= 0.0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "sparse_node_threshold_m must be positive",
            });
        }
        if self.lateral_g <= 0.0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "lateral_g must be positive",
            });
        }
        if self.resample_spacing_m <= 0.0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "resample_spacing_m must be positive",
            });
        }
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "smoothing_window must be odd and non-zero",
            });
        }
        let t = &self.severity_thresholds;
        if !(t.gentle > t.moderate && t.moderate > t.firm && t.firm > t.sharp && t.sharp > 0.0) {
            return Err(AnalyzeError::InvalidConfig {
                reason: "severity_thresholds must strictly descend: gentle > moderate > firm > sharp > 0",
            });
        }
        Ok(())
    }
}

/// Driving mode; affects deceleration model, lean-angle narration,
/// and the severity band used for the advisory-speed attachment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Car,
    Motorcycle,
}

/// How much detail to narrate. Ordered: higher tiers are a superset
/// of lower tiers' content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verbosity {
    Minimal = 1,
    Standard = 2,
    Detailed = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Mph,
    Kmh,
}

/// How far ahead (in time) the scheduler starts narrating a curve,
/// before braking distance is folded in. User-configurable in the
/// 5-15s range per spec.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingProfile {
    pub lookahead_seconds: f64,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            lookahead_seconds: 8.0,
        }
    }
}

/// Tunables for the online narration scheduler (§4.12-4.14).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationConfig {
    pub mode: Mode,
    pub verbosity: Verbosity,
    pub units: Units,
    pub timing_profile: TimingProfile,
    pub narrate_straights: bool,
    pub narrate_lean_angle: bool,
    pub narrate_surface: bool,
    pub min_announcement_distance_m: f64,
    /// Braking deceleration in m/s^2 used by the timing calculator.
    pub deceleration_ms2: f64,
}

impl NarrationConfig {
    /// Constructs a config with the mode-dependent defaults spec.md
    /// §3 specifies (4.0 m/s^2 car / 3.0 m/s^2 motorcycle).
    pub fn for_mode(mode: Mode) -> Self {
        let deceleration_ms2 = match mode {
            Mode::Car => 4.0,
            Mode::Motorcycle => 3.0,
        };
        Self {
            mode,
            verbosity: Verbosity::Standard,
            units: Units::Mph,
            timing_profile: TimingProfile::default(),
            narrate_straights: false,
            narrate_lean_angle: mode == Mode::Motorcycle,
            narrate_surface: false,
            min_announcement_distance_m: 100.0,
            deceleration_ms2,
        }
    }

    pub fn validate(&self) -> Result<(), AnalyzeError> {
        if self.min_announcement_distance_m <= 0.0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "min_announcement_distance_m must be positive",
            });
        }
        if self.deceleration_ms2 <= 0.0 {
            return Err(AnalyzeError::InvalidConfig {
                reason: "deceleration_ms2 must be positive",
            });
        }
        if !(5.0..=15.0).contains(&self.timing_profile.lookahead_seconds) {
            return Err(AnalyzeError::InvalidConfig {
                reason: "timing_profile.lookahead_seconds must be in [5, 15]",
            });
        }
        Ok(())
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self::for_mode(Mode::Car)
    }
}
