//! Integration tests for the touch session pipeline.
//!
//! These tests exercise the runtime end-to-end: sample sources feeding a
//! spawned `TouchSession`, with a mockall-generated `KeyInjector` standing in
//! for the OS input stack.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mockall::{mock, predicate, Sequence};
use tokio_test::{assert_err, assert_ok};

use touchkey_core::{
    HandSample, KeyboardLayout, Point, TouchEvent, TouchInputState, TouchValidationEngine,
    ValidationResult,
};
use touchkey_runtime::application::touch_session::{
    spawn_session, InjectError, KeyInjector, SessionError,
};
use touchkey_runtime::infrastructure::sample_source::mock::MockSampleSource;
use touchkey_runtime::infrastructure::sample_source::synthetic::{SyntheticSource, TypingProfile};
use touchkey_runtime::infrastructure::sample_source::{SampleFrame, SampleSource};

mock! {
    pub Injector {}

    #[async_trait]
    impl KeyInjector for Injector {
        async fn inject(&self, event: &TouchEvent) -> Result<(), InjectError>;
    }
}

fn layout_at(x: f64) -> KeyboardLayout {
    KeyboardLayout::qwerty(Point::new(x, 0.0), 40.0, 4.0).expect("qwerty layout must build")
}

fn q_touch(base: Instant) -> Vec<HandSample> {
    (0..3u64)
        .map(|i| {
            let finger = Point::new(20.0, 20.0);
            HandSample::new(
                finger,
                finger.offset(0.0, 0.3),
                0.9,
                i + 1,
                base + Duration::from_millis(i * 40),
            )
        })
        .collect()
}

// ── Injection ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_synthetic_word_injects_each_key_in_order() {
    // Arrange
    let layout = layout_at(0.0);
    let mut injector = MockInjector::new();
    let mut seq = Sequence::new();
    for id in ["h", "i"] {
        injector
            .expect_inject()
            .withf(move |e: &TouchEvent| e.key.identifier() == id && e.validated)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
    }
    let source = SyntheticSource::typing(&layout, "hi", &TypingProfile::default()).unwrap();
    let (handle, session, _feedback) =
        spawn_session(TouchValidationEngine::default(), layout, Arc::new(injector), 32);

    // Act
    for frame in source.start().unwrap().iter() {
        assert_ok!(handle.send_sample(frame.sample, frame.hand_detected).await);
    }
    assert_ok!(handle.shutdown().await);
    let last = session.await.unwrap();

    // Assert
    assert_eq!(last.statistics.successful_touches, 2);
    assert_eq!(last.injection_failures, 0);
    assert_eq!(last.state, TouchInputState::Idle);
}

#[tokio::test]
async fn test_frames_without_hand_never_inject() {
    let mut injector = MockInjector::new();
    injector.expect_inject().never();
    let (handle, _session, _feedback) = spawn_session(
        TouchValidationEngine::default(),
        layout_at(0.0),
        Arc::new(injector),
        8,
    );

    for sample in q_touch(Instant::now()) {
        assert_ok!(handle.send_sample(sample, false).await);
    }
    let snap = handle.snapshot().await.unwrap();

    assert_eq!(snap.frames_processed, 3);
    assert_eq!(snap.state, TouchInputState::Idle);
}

#[tokio::test]
async fn test_failed_injection_keeps_session_running() {
    // Arrange
    let mut injector = MockInjector::new();
    injector
        .expect_inject()
        .with(predicate::always())
        .returning(|_| Err(InjectError::Backend("device unplugged".to_string())));
    let (handle, _session, _feedback) = spawn_session(
        TouchValidationEngine::default(),
        layout_at(0.0),
        Arc::new(injector),
        8,
    );

    // Act
    for sample in q_touch(Instant::now()) {
        handle.send_sample(sample, true).await.unwrap();
    }
    let snap = handle.snapshot().await.unwrap();

    // Assert
    assert_eq!(snap.injection_failures, 1);
    assert!(snap.state.is_touching());
    assert_ok!(handle.reset_state().await);
}

// ── Control messages ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_layout_update_applies_to_following_frames() {
    // Arrange
    let mut injector = MockInjector::new();
    injector.expect_inject().never();
    let (handle, _session, mut feedback) = spawn_session(
        TouchValidationEngine::default(),
        layout_at(0.0),
        Arc::new(injector),
        8,
    );
    let frames = q_touch(Instant::now());

    // Act – move the keyboard 500 units right, then touch where q used to be.
    handle.update_layout(layout_at(500.0)).await.unwrap();
    handle.send_sample(frames[0].clone(), true).await.unwrap();
    let result = feedback.recv().await.expect("one result per frame");

    // Assert
    assert_eq!(result, ValidationResult::OutsideKey);
}

#[tokio::test]
async fn test_reset_clears_statistics_but_reset_state_keeps_them() {
    let mut injector = MockInjector::new();
    injector.expect_inject().returning(|_| Ok(()));
    let (handle, _session, _feedback) = spawn_session(
        TouchValidationEngine::default(),
        layout_at(0.0),
        Arc::new(injector),
        8,
    );

    for sample in q_touch(Instant::now()) {
        handle.send_sample(sample, true).await.unwrap();
    }
    handle.reset_state().await.unwrap();
    let kept = handle.snapshot().await.unwrap();
    handle.reset().await.unwrap();
    let cleared = handle.snapshot().await.unwrap();

    assert_eq!(kept.statistics.successful_touches, 1);
    assert_eq!(kept.state, TouchInputState::Idle);
    assert_eq!(cleared.statistics.total_touches, 0);
}

// ── Back-pressure ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_sample_drops_frames_when_queue_is_full() {
    // Arrange – the current-thread runtime does not run the session task
    // until this test yields, so the single queue slot stays occupied.
    let (handle, _session, _feedback) = spawn_session(
        TouchValidationEngine::default(),
        layout_at(0.0),
        Arc::new(MockInjector::new()),
        1,
    );
    let frames = q_touch(Instant::now());

    // Act
    let accepted: Vec<bool> = frames
        .iter()
        .map(|s| handle.submit_sample(s.clone(), true).unwrap())
        .collect();

    // Assert
    assert_eq!(accepted, vec![true, false, false]);
    assert_eq!(handle.dropped_frames(), 2);
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.frames_dropped, 2);
    assert_eq!(snap.frames_processed, 1);
}

#[tokio::test]
async fn test_handle_reports_closed_after_shutdown() {
    let (handle, session, _feedback) = spawn_session(
        TouchValidationEngine::default(),
        layout_at(0.0),
        Arc::new(MockInjector::new()),
        4,
    );
    handle.shutdown().await.unwrap();
    session.await.unwrap();

    let result = handle.snapshot().await;

    assert_err!(&result);
    assert_eq!(result, Err(SessionError::Closed));
}

// ── Sample sources ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mock_source_frames_flow_through_session() {
    // Arrange
    let mut injector = MockInjector::new();
    injector
        .expect_inject()
        .withf(|e: &TouchEvent| e.key.identifier() == "q")
        .times(1)
        .returning(|_| Ok(()));
    let (handle, _session, _feedback) = spawn_session(
        TouchValidationEngine::default(),
        layout_at(0.0),
        Arc::new(injector),
        8,
    );
    let source = MockSampleSource::new();
    let rx = source.start().unwrap();

    // Act
    for sample in q_touch(Instant::now()) {
        source.inject_frame(SampleFrame {
            sample,
            hand_detected: true,
        });
    }
    source.stop();
    for frame in rx.iter() {
        handle.send_sample(frame.sample, frame.hand_detected).await.unwrap();
    }
    let snap = handle.snapshot().await.unwrap();

    // Assert
    assert_eq!(snap.statistics.successful_touches, 1);
    assert_eq!(source.injected_count(), 3);
}
