//! Touch validation configuration.
//!
//! [`TouchValidationConfig`] is immutable once an engine has been built from
//! it.  Distances are in frame coordinate units, the same units the layout and
//! the detector use.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by [`TouchValidationConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A distance parameter is negative, zero where it must be positive, or not finite.
    #[error("{name} must be a finite positive number, got {value}")]
    InvalidDistance { name: &'static str, value: f64 },

    /// The thresholds are not ordered `distance ≤ release ≤ hover`.
    #[error(
        "thresholds must satisfy distance ({distance}) <= release ({release}) <= hover ({hover})"
    )]
    ThresholdOrder {
        distance: f64,
        release: f64,
        hover: f64,
    },

    /// `debounce_frames` is zero.
    #[error("debounce_frames must be at least 1")]
    ZeroDebounceFrames,

    /// `min_confidence_score` lies outside `[0, 1]`.
    #[error("min_confidence_score must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),
}

/// Thresholds and timings for the touch-validation state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchValidationConfig {
    /// Finger/shadow distance below which a frame is a touch candidate.
    pub distance_threshold: f64,
    /// Distance below which a finger counts as hovering over a key.
    pub hover_threshold: f64,
    /// Distance a confirmed touch must exceed before it is released.
    ///
    /// Must lie between `distance_threshold` and `hover_threshold`.  Setting it
    /// equal to `distance_threshold` disables hysteresis.
    pub release_threshold: f64,
    /// Tolerance around each key's printed edge.
    pub key_margin: f64,
    /// Minimum time a candidate must persist before it is confirmed.
    pub min_touch_duration: Duration,
    /// Consecutive candidate frames on one key required before confirmation.
    pub debounce_frames: u32,
    /// Floor for the combined detector × distance confidence.
    pub min_confidence_score: f64,
    /// Require the shadow tip to fall on the same key as the fingertip.
    pub require_shadow_validation: bool,
    /// Largest forward jump in frame numbers tolerated without restarting the
    /// debounce count.
    pub max_frame_gap: u64,
    /// Soft per-frame processing budget.  Overruns are logged only.
    pub frame_budget: Duration,
}

impl Default for TouchValidationConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 1.0,
            hover_threshold: 3.0,
            release_threshold: 2.0,
            key_margin: 2.0,
            min_touch_duration: Duration::from_millis(50),
            debounce_frames: 2,
            min_confidence_score: 0.5,
            require_shadow_validation: true,
            max_frame_gap: 5,
            frame_budget: Duration::from_millis(5),
        }
    }
}

impl TouchValidationConfig {
    /// Checks that the configuration describes a usable state machine.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidDistance`] for non-finite or non-positive
    ///   thresholds, or a negative/non-finite key margin.
    /// - [`ConfigError::ThresholdOrder`] unless
    ///   `distance_threshold ≤ release_threshold ≤ hover_threshold`.
    /// - [`ConfigError::ZeroDebounceFrames`] if `debounce_frames` is 0.
    /// - [`ConfigError::ConfidenceOutOfRange`] if the confidence floor is
    ///   outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("distance_threshold", self.distance_threshold),
            ("hover_threshold", self.hover_threshold),
            ("release_threshold", self.release_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDistance { name, value });
            }
        }
        if !self.key_margin.is_finite() || self.key_margin < 0.0 {
            return Err(ConfigError::InvalidDistance {
                name: "key_margin",
                value: self.key_margin,
            });
        }

        if self.distance_threshold > self.release_threshold
            || self.release_threshold > self.hover_threshold
        {
            return Err(ConfigError::ThresholdOrder {
                distance: self.distance_threshold,
                release: self.release_threshold,
                hover: self.hover_threshold,
            });
        }

        if self.debounce_frames == 0 {
            return Err(ConfigError::ZeroDebounceFrames);
        }

        if !(0.0..=1.0).contains(&self.min_confidence_score) {
            return Err(ConfigError::ConfidenceOutOfRange(self.min_confidence_score));
        }

        Ok(())
    }

    /// Returns `true` when `release_threshold` widens the touching band.
    pub fn hysteresis_enabled(&self) -> bool {
        self.release_threshold > self.distance_threshold
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
