//! What a `validate` call returns.
//!
//! Only [`ValidationResult::TouchValid`] carries a [`TouchEvent`] and only it
//! may trigger key injection.  Every other variant is advisory feedback for
//! the UI (hover highlight, rejection reason).

use std::time::Instant;

use crate::domain::geometry::Point;
use crate::domain::keyboard::KeyboardKey;

/// Immutable record of one confirmed touch.
///
/// Created once per touch transition and handed to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    /// The touched key.
    pub key: KeyboardKey,
    /// Fingertip position on the confirming frame.
    pub finger: Point,
    /// Shadow-tip position on the confirming frame.
    pub shadow: Point,
    /// Finger/shadow distance on the confirming frame.
    pub distance: f64,
    /// Combined detector × touch confidence in `[0, 1]`.
    pub confidence: f64,
    /// Capture time of the confirming frame.
    pub timestamp: Instant,
    /// Frame number of the confirming frame.
    pub frame_number: u64,
    /// Always `true` for events produced by the engine.
    pub validated: bool,
}

/// Per-frame decision.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// No hand is present (or the sample was unusable).
    Idle,
    /// The finger is within range but not a confirmed touch.
    ///
    /// `key` is `Some` when the finger is over a key (hovering, debouncing, or
    /// holding an already-confirmed touch) and `None` when it is above the
    /// hover band.
    HoverState {
        distance: f64,
        key: Option<KeyboardKey>,
    },
    /// The fingertip is not on any key.
    OutsideKey,
    /// The shadow tip is not on the fingertip's key.
    ShadowMismatch,
    /// A touch candidate whose combined confidence was below the floor.
    LowConfidence(f64),
    /// A confirmed touch.
    TouchValid(TouchEvent),
}

impl ValidationResult {
    /// Returns the touch event for [`ValidationResult::TouchValid`].
    pub fn touch_event(&self) -> Option<&TouchEvent> {
        match self {
            ValidationResult::TouchValid(event) => Some(event),
            _ => None,
        }
    }

    pub fn is_touch(&self) -> bool {
        matches!(self, ValidationResult::TouchValid(_))
    }

    /// The key to highlight for this frame, if any.
    pub fn hovered_key(&self) -> Option<&KeyboardKey> {
        match self {
            ValidationResult::HoverState { key, .. } => key.as_ref(),
            ValidationResult::TouchValid(event) => Some(&event.key),
            ValidationResult::Idle
            | ValidationResult::OutsideKey
            | ValidationResult::ShadowMismatch
            | ValidationResult::LowConfidence(_) => None,
        }
    }

    /// Short label for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            ValidationResult::Idle => "idle",
            ValidationResult::HoverState { .. } => "hover",
            ValidationResult::OutsideKey => "outside_key",
            ValidationResult::ShadowMismatch => "shadow_mismatch",
            ValidationResult::LowConfidence(_) => "low_confidence",
            ValidationResult::TouchValid(_) => "touch",
        }
    }
}
