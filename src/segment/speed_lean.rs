//! Advisory speed and lean-angle model (spec.md §4.7).

use crate::config::AnalysisConfig;

/// Standard gravity, m/s^2.
const GRAVITY_MS2: f64 = 9.81;

/// Lean angle narration value (spec.md §4.7): rounded to the nearest
/// 5 degrees and capped at 45. An angle whose *exact* (unrounded,
/// uncapped) value exceeds 45 degrees is tagged `extreme` instead of
/// carrying a numeric value — the narration grammar speaks "extreme
/// lean" rather than a capped number in that case.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LeanAngle {
    degrees: f64,
    extreme: bool,
}

impl LeanAngle {
    /// `exact_degrees` is the unrounded, uncapped computed angle.
    pub fn new(exact_degrees: f64) -> Self {
        let extreme = exact_degrees > 45.0;
        let degrees = (exact_degrees / 5.0).round() * 5.0;
        Self {
            degrees: degrees.clamp(0.0, 45.0),
            extreme,
        }
    }

    /// The rounded-to-5, capped-at-45 value. Narration should prefer
    /// [`LeanAngle::is_extreme`] over this number when `extreme`.
    pub fn degrees(self) -> f64 {
        self.degrees
    }

    /// True iff the exact computed lean angle exceeded 45 degrees —
    /// narration speaks "extreme lean" with no number in this case.
    pub fn is_extreme(self) -> bool {
        self.extreme
    }
}

/// Advisory speed (m/s) for a curve of the given minimum radius: the
/// speed at which the configured lateral-acceleration budget
/// (`config.lateral_g` fraction of g) is exactly reached.
///
/// `v = sqrt(lateral_g * g * r)`
pub fn advisory_speed_ms(min_radius_m: f64, config: &AnalysisConfig) -> f64 {
    let r = min_radius_m.max(0.0);
    (config.lateral_g * GRAVITY_MS2 * r).sqrt()
}

/// Lean angle a motorcycle needs to hold the advisory speed through a
/// curve of the given radius: `theta = atan(v^2 / (g * r))`.
pub fn lean_angle_deg(advisory_speed_ms: f64, min_radius_m: f64) -> LeanAngle {
    if min_radius_m <= 0.0 {
        return LeanAngle::new(45.0);
    }
    let theta = (advisory_speed_ms.powi(2) / (GRAVITY_MS2 * min_radius_m)).atan();
    LeanAngle::new(theta.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_speed_increases_with_radius() {
        let config = AnalysisConfig::default();
        let slow = advisory_speed_ms(20.0, &config);
        let fast = advisory_speed_ms(200.0, &config);
        assert!(fast > slow);
    }

    #[test]
    fn advisory_speed_matches_formula_for_known_radius() {
        let config = AnalysisConfig {
            lateral_g: 0.35,
            ..AnalysisConfig::default()
        };
        let v = advisory_speed_ms(100.0, &config);
        let expected = (0.35 * GRAVITY_MS2 * 100.0_f64).sqrt();
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn lean_angle_is_clamped_to_45_degrees() {
        let lean = lean_angle_deg(50.0, 5.0);
        assert_eq!(lean.degrees(), 45.0);
    }

    #[test]
    fn lean_angle_past_45_is_tagged_extreme() {
        let lean = lean_angle_deg(50.0, 5.0);
        assert!(lean.is_extreme());
    }

    #[test]
    fn lean_angle_rounds_to_nearest_5_degrees() {
        // atan(12^2 / (9.81*20)) ~= 36.3 degrees, rounds to 35.
        let lean = lean_angle_deg(12.0, 20.0);
        assert_eq!(lean.degrees() % 5.0, 0.0);
        assert!(!lean.is_extreme());
    }

    #[test]
    fn lean_angle_zero_for_straight_line_radius() {
        let lean = lean_angle_deg(0.0, 10_000.0);
        assert!(lean.degrees() < 1.0);
    }

    #[test]
    fn zero_radius_gives_max_lean() {
        let lean = lean_angle_deg(10.0, 0.0);
        assert_eq!(lean.degrees(), 45.0);
    }
}
