//! States of the touch-validation state machine.
//!
//! ```text
//!                 hand lost / reset
//!        ┌──────────────────────────────────────┐
//!        ▼                                      │
//!      Idle ──► Hovering ──► Debouncing ──► Touching
//!        ▲          ▲             │             │
//!        │          └─────────────┴─────────────┘
//!        │              distance rises / key changes
//!        └──── Invalid ◄── rejection (outside key, shadow mismatch, …)
//! ```

use std::fmt;

use crate::domain::keyboard::KeyboardKey;

/// Why the engine is in [`TouchInputState::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The fingertip is not on any key.
    OutsideKeyboard,
    /// The shadow tip is not on the fingertip's key.
    ShadowMismatch,
    /// The combined confidence fell below the configured floor.
    LowConfidence,
    /// The finger is above the hover band.
    OutOfRange,
    /// The sample broke the producer contract (non-finite or out-of-range values).
    MalformedSample,
    /// The sample's frame number went backwards.
    FrameOutOfOrder,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvalidReason::OutsideKeyboard => "outside keyboard",
            InvalidReason::ShadowMismatch => "shadow mismatch",
            InvalidReason::LowConfidence => "low confidence",
            InvalidReason::OutOfRange => "out of range",
            InvalidReason::MalformedSample => "malformed sample",
            InvalidReason::FrameOutOfOrder => "frame out of order",
        })
    }
}

/// The engine's current state.  Exactly one is active at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchInputState {
    /// No hand, or freshly reset.
    Idle,
    /// Finger near a key but not touching it.
    Hovering { key: KeyboardKey, distance: f64 },
    /// Touch candidate accumulating frames on `key`.
    Debouncing { key: KeyboardKey, frame_count: u32 },
    /// Confirmed touch still in contact.
    Touching {
        key: KeyboardKey,
        distance: f64,
        confidence: f64,
    },
    /// The last frame was rejected.
    Invalid { reason: InvalidReason },
}

impl TouchInputState {
    /// The key this state refers to, if any.
    pub fn key(&self) -> Option<&KeyboardKey> {
        match self {
            TouchInputState::Hovering { key, .. }
            | TouchInputState::Debouncing { key, .. }
            | TouchInputState::Touching { key, .. } => Some(key),
            TouchInputState::Idle | TouchInputState::Invalid { .. } => None,
        }
    }

    pub fn is_touching(&self) -> bool {
        matches!(self, TouchInputState::Touching { .. })
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            TouchInputState::Idle => "idle",
            TouchInputState::Hovering { .. } => "hovering",
            TouchInputState::Debouncing { .. } => "debouncing",
            TouchInputState::Touching { .. } => "touching",
            TouchInputState::Invalid { .. } => "invalid",
        }
    }
}

impl Default for TouchInputState {
    fn default() -> Self {
        TouchInputState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::keyboard::KeyRegion;

    fn key() -> KeyboardKey {
        KeyboardKey::new("q", 'q', KeyRegion::new(0.0, 0.0, 40.0, 40.0), 0, 0)
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(TouchInputState::default(), TouchInputState::Idle);
    }

    #[test]
    fn test_key_is_exposed_for_keyed_states_only() {
        let touching = TouchInputState::Touching {
            key: key(),
            distance: 0.2,
            confidence: 0.8,
        };
        assert_eq!(touching.key().map(|k| k.identifier()), Some("q"));
        assert!(touching.is_touching());
        assert!(TouchInputState::Invalid {
            reason: InvalidReason::ShadowMismatch
        }
        .key()
        .is_none());
    }

    #[test]
    fn test_invalid_reason_display() {
        assert_eq!(InvalidReason::OutsideKeyboard.to_string(), "outside keyboard");
        assert_eq!(InvalidReason::ShadowMismatch.to_string(), "shadow mismatch");
    }
}
