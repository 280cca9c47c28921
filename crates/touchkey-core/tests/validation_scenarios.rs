//! Integration tests for the touch-validation engine.
//!
//! These tests drive the engine through the public API with a standard QWERTY
//! layout (40-unit keys, 4-unit gaps, origin at 0,0) and check the end-to-end
//! behaviour for the canonical touch scenarios, plus replay through the trace
//! codec.

use std::time::{Duration, Instant};

use touchkey_core::{
    HandSample, InvalidReason, KeyboardLayout, KeyboardLayoutIndex, Point, TouchInputState,
    TouchValidationConfig, TouchValidationEngine, TraceFrame, TraceReader, TraceWriter,
    ValidationResult,
};

fn layout() -> KeyboardLayout {
    KeyboardLayout::qwerty(Point::new(0.0, 0.0), 40.0, 4.0).expect("qwerty layout must build")
}

fn engine() -> TouchValidationEngine {
    TouchValidationEngine::new(TouchValidationConfig::default()).expect("defaults must validate")
}

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

/// Fingertip at the centre of `q` with the shadow `distance` units below it.
fn q_sample(distance: f64, confidence: f64, frame: u64, timestamp: Instant) -> HandSample {
    let finger = Point::new(20.0, 20.0);
    HandSample::new(finger, finger.offset(0.0, distance), confidence, frame, timestamp)
}

// ── Scenario A: valid touch ───────────────────────────────────────────────────

#[test]
fn test_valid_touch_confirms_on_third_frame() {
    // Arrange
    let layout = layout();
    let mut engine = engine();
    let base = Instant::now();

    // Act
    let results: Vec<ValidationResult> = [0, 40, 80]
        .iter()
        .enumerate()
        .map(|(i, ms)| engine.validate(&q_sample(0.3, 0.9, i as u64 + 1, at(base, *ms)), &layout, true))
        .collect();

    // Assert
    assert!(!results[0].is_touch());
    assert!(!results[1].is_touch());
    let event = results[2].touch_event().expect("third frame must confirm");
    assert_eq!(event.key.identifier(), "q");
    assert!((event.confidence - 0.63).abs() < 1e-9);
    assert_eq!(event.timestamp, at(base, 80));
    assert!(engine.state().is_touching());
}

// ── Scenario B: hover and no contact ─────────────────────────────────────────

#[test]
fn test_hover_band_reports_key_without_touch() {
    let layout = layout();
    let mut engine = engine();

    let result = engine.validate(&q_sample(2.0, 0.9, 1, Instant::now()), &layout, true);

    match result {
        ValidationResult::HoverState { distance, key } => {
            assert_eq!(distance, 2.0);
            assert_eq!(key.map(|k| k.identifier().to_string()).as_deref(), Some("q"));
        }
        other => panic!("expected hover, got {other:?}"),
    }
    assert!(matches!(engine.state(), TouchInputState::Hovering { .. }));
}

#[test]
fn test_distance_beyond_hover_band_reports_no_key() {
    let layout = layout();
    let mut engine = engine();

    let result = engine.validate(&q_sample(5.0, 0.9, 1, Instant::now()), &layout, true);

    assert_eq!(
        result,
        ValidationResult::HoverState {
            distance: 5.0,
            key: None
        }
    );
    assert_eq!(
        engine.state(),
        &TouchInputState::Invalid {
            reason: InvalidReason::OutOfRange
        }
    );
}

// ── Scenario C: outside the keyboard ─────────────────────────────────────────

#[test]
fn test_fingertip_outside_keyboard() {
    let layout = layout();
    let mut engine = engine();
    let finger = Point::new(-50.0, 20.0);
    let sample = HandSample::new(finger, finger.offset(0.0, 0.2), 0.9, 1, Instant::now());

    let result = engine.validate(&sample, &layout, true);

    assert_eq!(result, ValidationResult::OutsideKey);
    assert_eq!(
        engine.state(),
        &TouchInputState::Invalid {
            reason: InvalidReason::OutsideKeyboard
        }
    );
}

#[test]
fn test_fingertip_in_gap_between_keys_is_outside() {
    let layout = layout();
    let mut engine = engine();
    // Between q (0..40) and w (44..84).
    let finger = Point::new(42.0, 20.0);
    let sample = HandSample::new(finger, finger, 0.9, 1, Instant::now());

    assert_eq!(engine.validate(&sample, &layout, true), ValidationResult::OutsideKey);
}

// ── Scenario D: shadow mismatch ──────────────────────────────────────────────

#[test]
fn test_shadow_on_neighbouring_key_is_rejected() {
    let layout = layout();
    let mut engine = engine();
    let w_center = layout.key("w").expect("w exists").region().center();
    let sample = HandSample::new(Point::new(20.0, 20.0), w_center, 0.9, 1, Instant::now());

    let result = engine.validate(&sample, &layout, true);

    assert_eq!(result, ValidationResult::ShadowMismatch);
    assert_eq!(
        engine.state(),
        &TouchInputState::Invalid {
            reason: InvalidReason::ShadowMismatch
        }
    );
}

// ── Scenario E: hand lost mid-debounce ───────────────────────────────────────

#[test]
fn test_hand_loss_mid_debounce_returns_idle() {
    // Arrange
    let layout = layout();
    let mut engine = engine();
    let base = Instant::now();
    engine.validate(&q_sample(0.3, 0.9, 1, base), &layout, true);
    assert_eq!(engine.debounce_count(), 1);

    // Act
    let result = engine.validate(&q_sample(0.3, 0.9, 2, at(base, 33)), &layout, false);

    // Assert
    assert_eq!(result, ValidationResult::Idle);
    assert_eq!(engine.state(), &TouchInputState::Idle);
    assert_eq!(engine.debounce_count(), 0);
    assert!(engine.last_valid_key().is_none());
    assert_eq!(engine.statistics().missed_touches, 1);
}

// ── Typing a word ─────────────────────────────────────────────────────────────

#[test]
fn test_typing_a_word_emits_one_event_per_letter() {
    // Arrange
    let layout = layout();
    let mut engine = engine();
    let base = Instant::now();
    let mut frame = 0u64;
    let mut clock = 0u64;
    let mut typed = String::new();

    // Act – each letter: hover, four contact frames, lift.
    for letter in "desk".chars() {
        let center = layout
            .key(&letter.to_string())
            .expect("letter exists")
            .region()
            .center();
        for distance in [2.5, 0.2, 0.2, 0.2, 0.2, 2.5] {
            frame += 1;
            clock += 33;
            let sample =
                HandSample::new(center, center.offset(distance, 0.0), 0.95, frame, at(base, clock));
            if let Some(event) = engine.validate(&sample, &layout, true).touch_event() {
                typed.push(event.key.display());
            }
        }
    }

    // Assert
    assert_eq!(typed, "desk");
    let stats = engine.statistics();
    assert_eq!(stats.successful_touches, 4);
    assert_eq!(stats.accuracy(), Some(1.0));
    assert!(stats.average_hover_to_touch_latency.is_some());
}

// ── Trace replay ──────────────────────────────────────────────────────────────

#[test]
fn test_replayed_trace_matches_live_decisions() {
    // Arrange – record three frames of a touch on q.
    let base = Instant::now();
    let live: Vec<HandSample> = (0..3)
        .map(|i| q_sample(0.3, 0.9, i + 1, at(base, i * 40)))
        .collect();
    let mut writer = TraceWriter::new(Vec::new()).expect("header write");
    for sample in &live {
        writer
            .write_frame(&TraceFrame::from_sample(sample, base, true))
            .expect("frame write");
    }
    let bytes = writer.finish().expect("flush");

    // Act
    let layout = layout();
    let mut live_engine = engine();
    let live_results: Vec<_> = live
        .iter()
        .map(|s| live_engine.validate(s, &layout, true).name())
        .collect();

    let replay_base = Instant::now();
    let mut replay_engine = engine();
    let replay_results: Vec<_> = TraceReader::new(bytes.as_slice())
        .expect("header read")
        .map(|f| {
            let f = f.expect("frame read");
            replay_engine
                .validate(&f.to_sample(replay_base), &layout, f.hand_detected)
                .name()
        })
        .collect();

    // Assert
    assert_eq!(live_results, replay_results);
    assert_eq!(replay_results, vec!["hover", "hover", "touch"]);
}
