//! Synthetic typing: generates the frames a finger would produce typing a
//! string on a layout.
//!
//! Each character becomes a short hover approach, a run of contact frames, and
//! a lift.  The geometry is ideal (fingertip on the key centre, shadow offset
//! straight to the right), which makes the output useful both as a replay
//! fixture and as a smoke test of the whole pipeline.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use touchkey_core::{KeyboardLayout, Point, TraceFrame};

use super::{SampleFrame, SampleSource, SourceError};

/// Timing and geometry of the synthetic finger.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingProfile {
    /// Time between frames (33 ms ≈ 30 fps).
    pub frame_interval: Duration,
    /// Hover frames before each contact.
    pub hover_frames: u32,
    /// Contact frames per key.  Four frames at 30 fps satisfy the default
    /// debounce settings, including the extra frame of the first touch.
    pub contact_frames: u32,
    pub hover_distance: f64,
    pub contact_distance: f64,
    pub confidence: f64,
}

impl Default for TypingProfile {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            hover_frames: 2,
            contact_frames: 4,
            hover_distance: 2.5,
            contact_distance: 0.2,
            confidence: 0.95,
        }
    }
}

/// Generates the trace frames for typing `text` on `layout`.
///
/// Characters are matched case-insensitively against each key's printed
/// character.  The trace ends with one hand-lost frame.
///
/// # Errors
///
/// Returns [`SourceError::UnknownKey`] for a character with no key.
pub fn typing_frames(
    layout: &KeyboardLayout,
    text: &str,
    profile: &TypingProfile,
) -> Result<Vec<TraceFrame>, SourceError> {
    let per_key = (profile.hover_frames + profile.contact_frames) as usize;
    let mut frames = Vec::with_capacity(text.chars().count() * per_key + 1);
    let step_us = profile.frame_interval.as_micros() as u64;
    let mut frame_number = 0u64;

    let mut push = |fingertip: Point, distance: f64, hand_detected: bool| {
        frame_number += 1;
        frames.push(TraceFrame {
            fingertip,
            shadow_tip: fingertip.offset(distance, 0.0),
            confidence: profile.confidence,
            frame_number,
            offset_us: (frame_number - 1) * step_us,
            hand_detected,
        });
    };

    for ch in text.chars() {
        let wanted = ch.to_ascii_lowercase();
        let key = layout
            .keys()
            .find(|k| k.display() == wanted)
            .ok_or(SourceError::UnknownKey(ch))?;
        let center = key.region().center();

        for _ in 0..profile.hover_frames {
            push(center, profile.hover_distance, true);
        }
        for _ in 0..profile.contact_frames {
            push(center, profile.contact_distance, true);
        }
    }
    push(Point::default(), 0.0, false);

    Ok(frames)
}

/// A [`SampleSource`] that replays pre-generated synthetic frames.
pub struct SyntheticSource {
    frames: Vec<TraceFrame>,
}

impl SyntheticSource {
    /// Builds a source that types `text` on `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnknownKey`] for a character with no key.
    pub fn typing(layout: &KeyboardLayout, text: &str, profile: &TypingProfile) -> Result<Self, SourceError> {
        Ok(Self {
            frames: typing_frames(layout, text, profile)?,
        })
    }

    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }
}

impl SampleSource for SyntheticSource {
    fn start(&self) -> Result<mpsc::Receiver<SampleFrame>, SourceError> {
        let (tx, rx) = mpsc::channel();
        let base = Instant::now();
        for frame in &self.frames {
            // The receiver is still in scope, so this cannot fail.
            let _ = tx.send(SampleFrame {
                sample: frame.to_sample(base),
                hand_detected: frame.hand_detected,
            });
        }
        Ok(rx)
    }

    fn stop(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchkey_core::TouchValidationEngine;

    fn layout() -> KeyboardLayout {
        KeyboardLayout::qwerty(Point::new(0.0, 0.0), 40.0, 4.0).unwrap()
    }

    #[test]
    fn test_frame_count_and_numbering() {
        // Arrange / Act
        let frames = typing_frames(&layout(), "hi", &TypingProfile::default()).unwrap();

        // Assert
        assert_eq!(frames.len(), 2 * 6 + 1);
        assert!(frames.windows(2).all(|w| w[1].frame_number == w[0].frame_number + 1));
        assert_eq!(frames[1].offset_us, 33_000);
        assert!(!frames.last().unwrap().hand_detected);
    }

    #[test]
    fn test_unknown_character_is_rejected() {
        let err = typing_frames(&layout(), "a?", &TypingProfile::default()).unwrap_err();
        assert!(matches!(err, SourceError::UnknownKey('?')));
    }

    #[test]
    fn test_synthetic_typing_is_recognised_by_engine() {
        // Arrange
        let layout = layout();
        let source = SyntheticSource::typing(&layout, "Hello World", &TypingProfile::default()).unwrap();
        let mut engine = TouchValidationEngine::default();
        let mut typed = String::new();

        // Act
        for frame in source.start().unwrap().iter() {
            if let Some(event) = engine
                .validate(&frame.sample, &layout, frame.hand_detected)
                .touch_event()
            {
                typed.push(event.key.display());
            }
        }

        // Assert
        assert_eq!(typed, "hello world");
        assert_eq!(engine.statistics().accuracy(), Some(1.0));
    }
}
