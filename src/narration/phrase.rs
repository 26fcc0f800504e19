//! Narration phrase grammar (spec.md §4.12): deterministic slot-based
//! composition of the text announced for a curve, in the fixed order
//! `[PREFIX]? [DIRECTION-SEVERITY] [MODIFIERS]? [COMPOUND]? [ADVISORY]? [LEAN]?`,
//! varying only with verbosity, units, and mode. Nothing here is
//! randomized or locale-sensitive; the same curve and config always
//! produce the same phrase.
//!
//! Distance-to-curve is deliberately not a phrase slot: the scheduler
//! decides *when* to speak via the trigger-distance calculation
//! (`crate::narration::timing`), not by narrating the distance itself.

use crate::config::{Mode, NarrationConfig, Units, Verbosity};
use crate::segment::{CompoundType, CurveDirection, CurveSegment, Severity};

/// Composes the phrase announced for `curve`, per the fixed slot
/// order of spec.md §4.12.
pub fn compose_curve_phrase(curve: &CurveSegment, config: &NarrationConfig) -> String {
    let mut phrase = String::new();

    if config.mode == Mode::Motorcycle && curve.modifiers.tightening() {
        phrase.push_str("caution, ");
    }

    phrase.push_str(&direction_severity_phrase(curve, config.verbosity));

    if let Some(modifiers) = modifiers_suffix(curve, config.verbosity) {
        phrase.push_str(&modifiers);
    }
    if let Some(compound) = compound_suffix(curve, config.verbosity) {
        phrase.push_str(&compound);
    }
    if let Some(advisory) = advisory_suffix(curve, config.units) {
        phrase.push_str(&advisory);
    }
    if let Some(lean) = lean_suffix(curve, config) {
        phrase.push_str(&lean);
    }
    if curve.confidence < 0.5 {
        phrase.push_str(", low data quality");
    }

    capitalize_first(&phrase)
}

/// Composes the phrase for a long straight stretch (spec.md §4.12:
/// only spoken at `Detailed` verbosity when `narrate_straights` is
/// set — that gate is the caller's responsibility, this function just
/// formats the text).
pub fn compose_straight_phrase(length_m: f64) -> String {
    format!("Straight, {:.0} meters", round_to_nearest(length_m, 10.0))
}

/// `"<severity> <direction>"`, e.g. "hairpin right" (spec.md §4.12).
/// Severity is dropped at `Minimal` when the curve is `Gentle`. A
/// right-angle curve overrides this whole slot with `"<direction>
/// ninety degree turn"`.
fn direction_severity_phrase(curve: &CurveSegment, verbosity: Verbosity) -> String {
    if curve.is_right_angle {
        return format!("{} ninety degree turn", direction_word(curve.direction));
    }
    if curve.severity == Severity::Gentle && verbosity == Verbosity::Minimal {
        return direction_word(curve.direction).to_string();
    }
    format!("{} {}", severity_word(curve.severity), direction_word(curve.direction))
}

fn severity_word(severity: Severity) -> &'static str {
    match severity {
        Severity::Gentle => "gentle",
        Severity::Moderate => "moderate",
        Severity::Firm => "firm",
        Severity::Sharp => "sharp",
        Severity::Hairpin => "hairpin",
    }
}

fn direction_word(direction: CurveDirection) -> &'static str {
    match direction {
        CurveDirection::Left => "left",
        CurveDirection::Right => "right",
    }
}

/// At `Standard`+: ", tightening" or ", opening". At `Detailed`,
/// additionally " holds for <arc_length rounded to 10m> meters" when
/// `HOLDS` (mutually exclusive with tightening/opening by the
/// modifier invariant, so at most one of the two ever fires).
fn modifiers_suffix(curve: &CurveSegment, verbosity: Verbosity) -> Option<String> {
    if verbosity < Verbosity::Standard {
        return None;
    }
    let mut suffix = String::new();
    if curve.modifiers.tightening() {
        suffix.push_str(", tightening");
    } else if curve.modifiers.opening() {
        suffix.push_str(", opening");
    }
    if verbosity == Verbosity::Detailed && curve.modifiers.holds() {
        suffix.push_str(&format!(" holds for {:.0} meters", round_to_nearest(curve.arc_length_m, 10.0)));
    }
    if suffix.is_empty() {
        None
    } else {
        Some(suffix)
    }
}

/// Compound pattern suffix. At `Minimal`, only `Chicane` and
/// `Switchbacks` are announced; the others are dropped (spec.md
/// §4.12).
fn compound_suffix(curve: &CurveSegment, verbosity: Verbosity) -> Option<String> {
    let kind = curve.compound_type?;
    if verbosity == Verbosity::Minimal && !matches!(kind, CompoundType::Chicane | CompoundType::Switchbacks) {
        return None;
    }
    Some(match kind {
        CompoundType::SBend => ", S-bend".to_string(),
        CompoundType::Chicane => ", chicane".to_string(),
        CompoundType::Series => format!(", series of {} curves", curve.compound_size.unwrap_or(0)),
        CompoundType::Switchbacks => format!(
            ", switchback {}/{}",
            curve.position_in_compound.unwrap_or(0),
            curve.compound_size.unwrap_or(0)
        ),
        CompoundType::TighteningSequence => ", tightening sequence".to_string(),
    })
}

/// ", slow to <rounded speed> <units>" when the curve carries an
/// advisory speed; floored to the nearest multiple of 5 in the
/// configured display unit (spec.md §4.7, §4.12).
fn advisory_suffix(curve: &CurveSegment, units: Units) -> Option<String> {
    let speed_ms = curve.advisory_speed_ms?;
    let (value, unit_word) = match units {
        Units::Kmh => (speed_ms * 3.6, "km/h"),
        Units::Mph => (speed_ms * 2.23694, "mph"),
    };
    Some(format!(", slow to {:.0} {}", floor_to_nearest(value, 5.0), unit_word))
}

/// ", lean <angle> degrees", or ", extreme lean" for an angle whose
/// exact value exceeded the 45-degree cap (spec.md §4.7, §4.12). Only
/// narrated in motorcycle mode, when `narrate_lean_angle` is set, and
/// when the curve carries an advisory speed.
fn lean_suffix(curve: &CurveSegment, config: &NarrationConfig) -> Option<String> {
    if config.mode != Mode::Motorcycle || !config.narrate_lean_angle {
        return None;
    }
    curve.advisory_speed_ms?;
    let lean = curve.lean_angle_deg?;
    if lean.is_extreme() {
        Some(", extreme lean".to_string())
    } else {
        Some(format!(", lean {:.0} degrees", lean.degrees()))
    }
}

fn round_to_nearest(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

fn floor_to_nearest(value: f64, step: f64) -> f64 {
    (value / step).floor() * step
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
