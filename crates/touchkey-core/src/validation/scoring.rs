//! Pure distance classification and confidence scoring.

use crate::validation::config::TouchValidationConfig;

/// Classification of a finger/shadow distance.
///
/// The bands are half-open and cover `[0, ∞)` without overlap:
/// `[0, distance_threshold)`, `[distance_threshold, hover_threshold)`,
/// `[hover_threshold, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    TouchCandidate,
    Hover,
    NoContact,
}

/// Sorts `distance` into its band.
pub fn classify_distance(distance: f64, config: &TouchValidationConfig) -> DistanceBand {
    if distance < config.distance_threshold {
        DistanceBand::TouchCandidate
    } else if distance < config.hover_threshold {
        DistanceBand::Hover
    } else {
        DistanceBand::NoContact
    }
}

/// Distance-derived touch certainty: `max(0, 1 − distance / threshold)`.
///
/// 1 when fingertip and shadow coincide, falling linearly to 0 at the
/// threshold and staying 0 beyond it.
pub fn touch_confidence(distance: f64, distance_threshold: f64) -> f64 {
    (1.0 - distance / distance_threshold).max(0.0)
}

/// Detector confidence scaled by touch certainty, clamped to `[0, 1]`.
pub fn combined_confidence(detection_confidence: f64, distance: f64, distance_threshold: f64) -> f64 {
    (detection_confidence * touch_confidence(distance, distance_threshold)).clamp(0.0, 1.0)
}
