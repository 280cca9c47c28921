//! TouchValidationEngine: classifies hand samples into debounced key touches.
//!
//! The engine is called once per processed frame.  It looks up the key under
//! the fingertip, checks that the shadow agrees, sorts the finger/shadow
//! distance into a band, and runs the debounce gate that turns a persistent
//! touch candidate into exactly one [`TouchEvent`].
//!
//! # Architecture
//!
//! The engine owns all of its mutable state and depends only on the
//! [`KeyboardLayoutIndex`] trait, so it can be driven from a test, a replay
//! file, or the live session without changes.  It performs no I/O and never
//! blocks; the only side effects are its own fields and the statistics
//! tracker.
//!
//! # Timing
//!
//! Durations are measured between sample timestamps, not with the wall clock,
//! so replayed sessions produce the same decisions as live ones.  The wall
//! clock is used only to check each call against the soft frame budget.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::keyboard::{KeyboardKey, KeyboardLayoutIndex};
use crate::domain::sample::HandSample;
use crate::stats::{TouchStatistics, TouchStatisticsTracker};
use crate::validation::config::{ConfigError, TouchValidationConfig};
use crate::validation::result::{TouchEvent, ValidationResult};
use crate::validation::scoring::{classify_distance, combined_confidence, DistanceBand};
use crate::validation::state::{InvalidReason, TouchInputState};

/// How an unconfirmed touch candidate ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Abandon {
    Missed,
    Invalid,
}

/// The touch-validation state machine.
///
/// Create one engine per session and drive it from a single thread; see
/// `touchkey-runtime`'s `TouchSession` for the message-passing wrapper used
/// when several threads need access.
#[derive(Debug)]
pub struct TouchValidationEngine {
    config: TouchValidationConfig,
    state: TouchInputState,
    /// Consecutive candidate frames on `last_valid_key`.  Zero when no
    /// candidate is pending, including while a confirmed touch is held.
    debounce_count: u32,
    last_valid_key: Option<KeyboardKey>,
    /// Timestamp of the first frame of the current candidate run.
    debounce_started_at: Option<Instant>,
    /// Anchor for the minimum-duration check; the time of the last confirmed
    /// touch once one exists.
    last_touch_time: Option<Instant>,
    /// Key identifier and time the finger started hovering over it.
    hover_anchor: Option<(String, Instant)>,
    last_frame: Option<u64>,
    statistics: TouchStatisticsTracker,
}

impl TouchValidationEngine {
    /// Creates an engine in the `Idle` state.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`TouchValidationConfig::validate`]
    /// if the configuration is inconsistent.
    pub fn new(config: TouchValidationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: TouchInputState::Idle,
            debounce_count: 0,
            last_valid_key: None,
            debounce_started_at: None,
            last_touch_time: None,
            hover_anchor: None,
            last_frame: None,
            statistics: TouchStatisticsTracker::new(),
        })
    }

    pub fn config(&self) -> &TouchValidationConfig {
        &self.config
    }

    /// The current state machine state.
    pub fn state(&self) -> &TouchInputState {
        &self.state
    }

    /// Consecutive candidate frames counted so far.
    pub fn debounce_count(&self) -> u32 {
        self.debounce_count
    }

    /// The key the current candidate run is on.
    pub fn last_valid_key(&self) -> Option<&KeyboardKey> {
        self.last_valid_key.as_ref()
    }

    pub fn last_touch_time(&self) -> Option<Instant> {
        self.last_touch_time
    }

    /// Snapshot of the accumulated statistics.
    pub fn statistics(&self) -> TouchStatistics {
        self.statistics.snapshot()
    }

    /// Returns the engine to `Idle` and clears every counter, including the
    /// statistics.
    pub fn reset(&mut self) {
        self.reset_state();
        self.reset_statistics();
    }

    /// Returns the engine to `Idle` and clears the debounce and timing state,
    /// keeping statistics.
    pub fn reset_state(&mut self) {
        self.clear_debounce();
        self.last_touch_time = None;
        self.hover_anchor = None;
        self.last_frame = None;
        self.transition(TouchInputState::Idle);
    }

    pub fn reset_statistics(&mut self) {
        self.statistics.reset();
    }

    /// Evaluates one frame.
    ///
    /// `hand_detected` is the detector's own verdict for this frame; when it is
    /// `false` the sample contents are ignored and the engine goes idle.
    pub fn validate<L>(
        &mut self,
        sample: &HandSample,
        layout: &L,
        hand_detected: bool,
    ) -> ValidationResult
    where
        L: KeyboardLayoutIndex + ?Sized,
    {
        let started = Instant::now();
        let result = self.evaluate(sample, layout, hand_detected);
        let elapsed = started.elapsed();
        if elapsed > self.config.frame_budget {
            warn!(
                frame = sample.frame_number,
                elapsed_us = elapsed.as_micros() as u64,
                budget_us = self.config.frame_budget.as_micros() as u64,
                "touch validation exceeded frame budget"
            );
        }
        result
    }

    // ── Decision pipeline ─────────────────────────────────────────────────────

    fn evaluate<L>(&mut self, sample: &HandSample, layout: &L, hand_detected: bool) -> ValidationResult
    where
        L: KeyboardLayoutIndex + ?Sized,
    {
        if !hand_detected {
            self.abandon_candidate(Abandon::Missed);
            self.clear_debounce();
            self.last_touch_time = None;
            self.hover_anchor = None;
            self.transition(TouchInputState::Idle);
            return ValidationResult::Idle;
        }

        if !sample.is_well_formed() {
            warn!(frame = sample.frame_number, "rejecting malformed hand sample");
            self.reject(InvalidReason::MalformedSample);
            return ValidationResult::Idle;
        }

        if let Some(last) = self.last_frame {
            if sample.frame_number < last {
                warn!(
                    frame = sample.frame_number,
                    last_frame = last,
                    "rejecting out-of-order hand sample"
                );
                self.reject(InvalidReason::FrameOutOfOrder);
                return ValidationResult::Idle;
            }
            // Only a pending candidate is dropped on a gap.  A held touch is
            // released by the distance and key checks alone.
            let gap = sample.frame_number - last;
            if gap > self.config.max_frame_gap && self.debounce_count > 0 {
                debug!(gap, "frame gap too large, restarting debounce");
                self.abandon_candidate(Abandon::Missed);
                self.clear_debounce();
            }
        }
        self.last_frame = Some(sample.frame_number);

        let distance = sample.distance();

        let Some(key) = layout.key_at(&sample.fingertip) else {
            self.reject(InvalidReason::OutsideKeyboard);
            return ValidationResult::OutsideKey;
        };
        if !key.contains(&sample.fingertip, self.config.key_margin) {
            self.reject(InvalidReason::OutsideKeyboard);
            return ValidationResult::OutsideKey;
        }
        if self.config.require_shadow_validation
            && !key.contains(&sample.shadow_tip, self.config.key_margin)
        {
            self.reject(InvalidReason::ShadowMismatch);
            return ValidationResult::ShadowMismatch;
        }

        // A confirmed touch stays down until the distance clears the release
        // threshold; no second event is produced while it is held.
        if self.is_holding(key) && distance < self.config.release_threshold {
            let confidence = combined_confidence(
                sample.detection_confidence,
                distance,
                self.config.distance_threshold,
            );
            self.state = TouchInputState::Touching {
                key: key.clone(),
                distance,
                confidence,
            };
            return ValidationResult::HoverState {
                distance,
                key: Some(key.clone()),
            };
        }

        match classify_distance(distance, &self.config) {
            DistanceBand::TouchCandidate => {}
            DistanceBand::Hover => {
                self.enter_hover(key, distance, sample.timestamp);
                return ValidationResult::HoverState {
                    distance,
                    key: Some(key.clone()),
                };
            }
            DistanceBand::NoContact => {
                self.abandon_candidate(Abandon::Missed);
                self.clear_debounce();
                self.hover_anchor = None;
                self.transition(TouchInputState::Invalid {
                    reason: InvalidReason::OutOfRange,
                });
                return ValidationResult::HoverState {
                    distance,
                    key: None,
                };
            }
        }

        let confidence = combined_confidence(
            sample.detection_confidence,
            distance,
            self.config.distance_threshold,
        );
        if confidence < self.config.min_confidence_score {
            self.reject(InvalidReason::LowConfidence);
            return ValidationResult::LowConfidence(confidence);
        }

        self.debounce(sample, key, distance, confidence)
    }

    /// Counts a candidate frame and confirms the touch once the frame count
    /// and duration requirements are both met.
    fn debounce(
        &mut self,
        sample: &HandSample,
        key: &KeyboardKey,
        distance: f64,
        confidence: f64,
    ) -> ValidationResult {
        let same_key = self
            .last_valid_key
            .as_ref()
            .is_some_and(|last| last.same_key(key));

        if same_key {
            self.debounce_count = self.debounce_count.saturating_add(1);
        } else {
            self.abandon_candidate(Abandon::Missed);
            self.debounce_count = 1;
            self.last_valid_key = Some(key.clone());
            self.debounce_started_at = Some(sample.timestamp);
        }
        self.transition(TouchInputState::Debouncing {
            key: key.clone(),
            frame_count: self.debounce_count,
        });

        let pending = ValidationResult::HoverState {
            distance,
            key: Some(key.clone()),
        };

        if self.debounce_count < self.config.debounce_frames {
            return pending;
        }

        let run_start = self.debounce_started_at.unwrap_or(sample.timestamp);
        let Some(last_touch) = self.last_touch_time else {
            // First touch of the session: anchor the duration check and defer
            // confirmation to the next frame.
            self.last_touch_time = Some(run_start);
            debug!(key = key.identifier(), "anchored touch timer");
            return pending;
        };

        // Measured from the later of the last touch and the start of this run,
        // not from the last touch alone: a run that begins long after the
        // previous touch must still persist for `min_touch_duration`.
        let anchor = last_touch.max(run_start);
        if sample.timestamp.saturating_duration_since(anchor) < self.config.min_touch_duration {
            return pending;
        }

        self.confirm(sample, key, distance, confidence)
    }

    fn confirm(
        &mut self,
        sample: &HandSample,
        key: &KeyboardKey,
        distance: f64,
        confidence: f64,
    ) -> ValidationResult {
        let event = TouchEvent {
            key: key.clone(),
            finger: sample.fingertip,
            shadow: sample.shadow_tip,
            distance,
            confidence,
            timestamp: sample.timestamp,
            frame_number: sample.frame_number,
            validated: true,
        };

        self.statistics.record_success(key.identifier(), confidence);
        if let Some((hover_key, since)) = self.hover_anchor.take() {
            if hover_key == key.identifier() {
                self.statistics
                    .record_hover_to_touch_latency(sample.timestamp.saturating_duration_since(since));
            }
        }

        self.debounce_count = 0;
        self.last_touch_time = Some(sample.timestamp);
        self.transition(TouchInputState::Touching {
            key: key.clone(),
            distance,
            confidence,
        });

        info!(
            key = key.identifier(),
            frame = sample.frame_number,
            distance,
            confidence,
            "touch confirmed"
        );
        ValidationResult::TouchValid(event)
    }

    // ── State helpers ─────────────────────────────────────────────────────────

    fn is_holding(&self, key: &KeyboardKey) -> bool {
        matches!(&self.state, TouchInputState::Touching { key: held, .. } if held.same_key(key))
    }

    fn enter_hover(&mut self, key: &KeyboardKey, distance: f64, at: Instant) {
        self.abandon_candidate(Abandon::Missed);
        self.clear_debounce();
        let anchored_here = self
            .hover_anchor
            .as_ref()
            .is_some_and(|(id, _)| id == key.identifier());
        if !anchored_here {
            self.hover_anchor = Some((key.identifier().to_string(), at));
        }
        self.transition(TouchInputState::Hovering {
            key: key.clone(),
            distance,
        });
    }

    fn reject(&mut self, reason: InvalidReason) {
        self.abandon_candidate(Abandon::Invalid);
        self.clear_debounce();
        self.hover_anchor = None;
        self.transition(TouchInputState::Invalid { reason });
    }

    /// Counts a pending, unconfirmed candidate run before it is discarded.
    fn abandon_candidate(&mut self, how: Abandon) {
        if self.debounce_count == 0 {
            return;
        }
        debug!(
            frames = self.debounce_count,
            outcome = ?how,
            "touch candidate abandoned"
        );
        match how {
            Abandon::Missed => self.statistics.record_missed(),
            Abandon::Invalid => self.statistics.record_invalid(),
        }
        self.debounce_count = 0;
    }

    fn clear_debounce(&mut self) {
        self.debounce_count = 0;
        self.last_valid_key = None;
        self.debounce_started_at = None;
    }

    fn transition(&mut self, next: TouchInputState) {
        if self.state.name() != next.name() {
            debug!(from = self.state.name(), to = next.name(), "touch state transition");
        }
        self.state = next;
    }
}

impl Default for TouchValidationEngine {
    fn default() -> Self {
        Self {
            config: TouchValidationConfig::default(),
            state: TouchInputState::Idle,
            debounce_count: 0,
            last_valid_key: None,
            debounce_started_at: None,
            last_touch_time: None,
            hover_anchor: None,
            last_frame: None,
            statistics: TouchStatisticsTracker::new(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
