//! Narration timing calculator (spec.md §4.13): how far before a
//! curve's start to trigger its announcement.

use crate::config::NarrationConfig;

/// Trigger distance in meters, measured back from the curve's start.
///
/// `base = max(lookahead_seconds * speed_ms, min_announcement_distance_m)`.
/// If `advisory_speed_ms` is defined and below `speed_ms`, the braking
/// distance needed to decelerate from `speed_ms` to it at
/// `config.deceleration_ms2` is folded in as `max(base, 1.5 *
/// braking)`. Otherwise the trigger distance is just `base`.
pub fn compute_trigger_distance_m(speed_ms: f64, advisory_speed_ms: Option<f64>, config: &NarrationConfig) -> f64 {
    let base = (config.timing_profile.lookahead_seconds * speed_ms).max(config.min_announcement_distance_m);

    match advisory_speed_ms {
        Some(v_a) if speed_ms > v_a => {
            let braking = (speed_ms.powi(2) - v_a.powi(2)) / (2.0 * config.deceleration_ms2);
            base.max(1.5 * braking)
        }
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    #[test]
    fn faster_current_speed_increases_trigger_distance() {
        let config = NarrationConfig::for_mode(Mode::Car);
        let slow = compute_trigger_distance_m(10.0, Some(8.0), &config);
        let fast = compute_trigger_distance_m(30.0, Some(8.0), &config);
        assert!(fast > slow);
    }

    #[test]
    fn no_braking_term_when_advisory_speed_not_below_current() {
        let config = NarrationConfig::for_mode(Mode::Car);
        let trigger = compute_trigger_distance_m(10.0, Some(20.0), &config);
        let base = (config.timing_profile.lookahead_seconds * 10.0).max(config.min_announcement_distance_m);
        assert!((trigger - base).abs() < 1e-9);
    }

    #[test]
    fn no_advisory_speed_falls_back_to_base() {
        let config = NarrationConfig::for_mode(Mode::Car);
        let trigger = compute_trigger_distance_m(10.0, None, &config);
        let base = (config.timing_profile.lookahead_seconds * 10.0).max(config.min_announcement_distance_m);
        assert!((trigger - base).abs() < 1e-9);
    }

    #[test]
    fn large_speed_drop_can_exceed_base_via_braking_term() {
        let config = NarrationConfig::for_mode(Mode::Car);
        let trigger = compute_trigger_distance_m(30.0, Some(5.0), &config);
        let base = (config.timing_profile.lookahead_seconds * 30.0).max(config.min_announcement_distance_m);
        let braking = (30.0f64.powi(2) - 5.0f64.powi(2)) / (2.0 * config.deceleration_ms2);
        assert!((trigger - base.max(1.5 * braking)).abs() < 1e-9);
        assert!(trigger > base);
    }

    #[test]
    fn trigger_distance_never_below_min_announcement_distance() {
        let config = NarrationConfig::for_mode(Mode::Car);
        let trigger = compute_trigger_distance_m(0.1, Some(0.1), &config);
        assert!(trigger >= config.min_announcement_distance_m);
    }
}
