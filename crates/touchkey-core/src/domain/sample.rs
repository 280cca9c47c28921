//! Hand samples: one observation per processed camera frame.

use std::time::Instant;

use crate::domain::geometry::Point;

/// One fingertip/shadow observation produced by the upstream detector.
///
/// The producer guarantees finite coordinates and a detection confidence in
/// `[0, 1]`; [`is_well_formed`](HandSample::is_well_formed) checks that
/// contract so the engine can reject violations instead of faulting.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSample {
    /// Detected fingertip position.
    pub fingertip: Point,
    /// Tip of the finger's shadow on the surface.
    pub shadow_tip: Point,
    /// Detector confidence in `[0, 1]`.
    pub detection_confidence: f64,
    /// Monotonic frame counter assigned by the producer.
    pub frame_number: u64,
    /// Capture time of the frame.
    pub timestamp: Instant,
}

impl HandSample {
    pub fn new(
        fingertip: Point,
        shadow_tip: Point,
        detection_confidence: f64,
        frame_number: u64,
        timestamp: Instant,
    ) -> Self {
        Self {
            fingertip,
            shadow_tip,
            detection_confidence,
            frame_number,
            timestamp,
        }
    }

    /// Finger-to-shadow distance for this frame.
    pub fn distance(&self) -> f64 {
        self.fingertip.distance_to(&self.shadow_tip)
    }

    /// Returns `true` if the sample honours the producer contract.
    pub fn is_well_formed(&self) -> bool {
        self.fingertip.is_finite()
            && self.shadow_tip.is_finite()
            && (0.0..=1.0).contains(&self.detection_confidence)
    }
}
