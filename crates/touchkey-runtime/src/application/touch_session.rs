//! TouchSession: the single owner of a validation engine and its layout.
//!
//! The engine is a single-threaded state machine.  Camera capture, UI, and
//! control code usually live on different threads, so instead of sharing the
//! engine behind a lock the session runs as its own Tokio task and everything
//! else talks to it through a [`SessionHandle`].
//!
//! # Message flow
//!
//! ```text
//! producer ──Sample──┐
//! control  ──Reset───┤  bounded mpsc   ┌──────────────┐   TouchValid   ┌─────────────┐
//! UI       ──Snapshot┼───────────────► │ TouchSession │ ─────────────► │ KeyInjector │
//!                    │                 └──────┬───────┘                └─────────────┘
//!                    │                        │ every ValidationResult
//!                    │                        ▼
//!                    │                 feedback receiver (UI highlight)
//! ```
//!
//! Samples and control messages share one channel, so a reset is applied
//! exactly between two frames and never in the middle of one.
//!
//! # Back-pressure
//!
//! [`SessionHandle::submit_sample`] never blocks the producer: when the
//! channel is full the frame is dropped and counted.  Replay code that must
//! not lose frames uses [`SessionHandle::send_sample`] instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use touchkey_core::{
    HandSample, KeyboardLayout, KeyboardLayoutIndex, TouchEvent, TouchInputState, TouchStatistics,
    TouchValidationEngine, ValidationResult,
};

/// Unique identifier of one touch session, attached to its log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error type for talking to a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session task has stopped and no longer accepts commands.
    #[error("touch session has shut down")]
    Closed,
}

/// Error returned by a [`KeyInjector`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectError {
    /// The key has no HID usage to inject.
    #[error("no HID usage for key {0:?}")]
    Unmapped(String),

    /// The injection backend rejected or could not deliver the key.
    #[error("injection backend failed: {0}")]
    Backend(String),
}

/// Delivers confirmed touches to the host as key presses.
///
/// Infrastructure implementations talk to the OS input stack; test
/// implementations record calls.
#[async_trait]
pub trait KeyInjector: Send + Sync {
    /// Injects the key for one confirmed touch.
    async fn inject(&self, event: &TouchEvent) -> Result<(), InjectError>;
}

/// A message for the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// One camera frame.
    Sample {
        sample: HandSample,
        hand_detected: bool,
    },
    /// Back to `Idle` and clear statistics.
    Reset,
    /// Back to `Idle`, keeping statistics.
    ResetState,
    /// Swap the layout.  The engine state is reset because keys may have moved.
    UpdateLayout(KeyboardLayout),
    /// Reply with the current [`SessionSnapshot`].
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Stop the task after the commands already queued ahead of it.
    Shutdown,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub state: TouchInputState,
    pub statistics: TouchStatistics,
    /// Frames handed to the engine.
    pub frames_processed: u64,
    /// Frames discarded by [`SessionHandle::submit_sample`] because the
    /// channel was full.
    pub frames_dropped: u64,
    pub injection_failures: u64,
}

// ── Session task ──────────────────────────────────────────────────────────────

/// The session state owned by the spawned task.
pub struct TouchSession {
    id: SessionId,
    engine: TouchValidationEngine,
    layout: KeyboardLayout,
    injector: Arc<dyn KeyInjector>,
    feedback: mpsc::Sender<ValidationResult>,
    dropped: Arc<AtomicU64>,
    frames_processed: u64,
    injection_failures: u64,
}

impl TouchSession {
    fn new(
        engine: TouchValidationEngine,
        layout: KeyboardLayout,
        injector: Arc<dyn KeyInjector>,
        feedback: mpsc::Sender<ValidationResult>,
        dropped: Arc<AtomicU64>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            engine,
            layout,
            injector,
            feedback,
            dropped,
            frames_processed: 0,
            injection_failures: 0,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            state: self.engine.state().clone(),
            statistics: self.engine.statistics(),
            frames_processed: self.frames_processed,
            frames_dropped: self.dropped.load(Ordering::Relaxed),
            injection_failures: self.injection_failures,
        }
    }

    /// Processes commands until `Shutdown` or until every handle is dropped,
    /// then returns the final snapshot.
    async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) -> SessionSnapshot {
        info!(session_id = %self.id, "touch session started");
        while let Some(command) = commands.recv().await {
            if !self.handle_command(command).await {
                break;
            }
        }
        let last = self.snapshot();
        info!(
            session_id = %self.id,
            frames = last.frames_processed,
            touches = last.statistics.successful_touches,
            dropped = last.frames_dropped,
            "touch session stopped"
        );
        last
    }

    /// Applies one command.  Returns `false` when the session should stop.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Sample {
                sample,
                hand_detected,
            } => self.process_sample(sample, hand_detected).await,
            SessionCommand::Reset => {
                debug!(session_id = %self.id, "full reset requested");
                self.engine.reset();
            }
            SessionCommand::ResetState => {
                debug!(session_id = %self.id, "state reset requested");
                self.engine.reset_state();
            }
            SessionCommand::UpdateLayout(layout) => {
                info!(session_id = %self.id, keys = layout.key_count(), "layout updated");
                self.layout = layout;
                self.engine.reset_state();
            }
            SessionCommand::Snapshot(reply) => {
                // The requester may have given up waiting.
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => return false,
        }
        true
    }

    async fn process_sample(&mut self, sample: HandSample, hand_detected: bool) {
        let result = self.engine.validate(&sample, &self.layout, hand_detected);
        self.frames_processed += 1;

        if let Some(event) = result.touch_event() {
            if let Err(e) = self.injector.inject(event).await {
                self.injection_failures += 1;
                warn!(
                    session_id = %self.id,
                    key = event.key.identifier(),
                    "key injection failed: {e}"
                );
            }
        }

        match self.feedback.try_send(result) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(frame = sample.frame_number, "feedback channel full, result dropped");
            }
            // Nobody is listening for feedback; that is allowed.
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cloneable sender side of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    commands: mpsc::Sender<SessionCommand>,
    dropped: Arc<AtomicU64>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queues a frame without waiting.
    ///
    /// Returns `Ok(false)` if the channel was full and the frame was dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has stopped.
    pub fn submit_sample(&self, sample: HandSample, hand_detected: bool) -> Result<bool, SessionError> {
        let frame = sample.frame_number;
        match self.commands.try_send(SessionCommand::Sample {
            sample,
            hand_detected,
        }) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(session_id = %self.id, frame, "session queue full, frame dropped");
                Ok(false)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SessionError::Closed),
        }
    }

    /// Queues a frame, waiting for channel capacity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has stopped.
    pub async fn send_sample(&self, sample: HandSample, hand_detected: bool) -> Result<(), SessionError> {
        self.send(SessionCommand::Sample {
            sample,
            hand_detected,
        })
        .await
    }

    /// Blocking variant of [`send_sample`](Self::send_sample) for producer
    /// threads outside the async runtime.
    ///
    /// Must not be called from inside an async task.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has stopped.
    pub fn blocking_send_sample(&self, sample: HandSample, hand_detected: bool) -> Result<(), SessionError> {
        self.commands
            .blocking_send(SessionCommand::Sample {
                sample,
                hand_detected,
            })
            .map_err(|_| SessionError::Closed)
    }

    /// Returns the session to `Idle` and clears statistics.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has stopped.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Reset).await
    }

    /// Returns the session to `Idle`, keeping statistics.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has stopped.
    pub async fn reset_state(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ResetState).await
    }

    /// Replaces the layout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has stopped.
    pub async fn update_layout(&self, layout: KeyboardLayout) -> Result<(), SessionError> {
        self.send(SessionCommand::UpdateLayout(layout)).await
    }

    /// Asks the session for a snapshot.  Commands queued earlier are applied
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session stops before replying.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Asks the session to stop after the commands already queued.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has already stopped.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Frames dropped by [`submit_sample`](Self::submit_sample) so far.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

/// Spawns a session task on the current Tokio runtime.
///
/// `capacity` bounds both the command channel and the feedback channel; zero
/// is treated as one.  The join handle resolves to the final snapshot once the
/// session stops.
pub fn spawn_session(
    engine: TouchValidationEngine,
    layout: KeyboardLayout,
    injector: Arc<dyn KeyInjector>,
    capacity: usize,
) -> (
    SessionHandle,
    JoinHandle<SessionSnapshot>,
    mpsc::Receiver<ValidationResult>,
) {
    let capacity = capacity.max(1);
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (feedback_tx, feedback_rx) = mpsc::channel(capacity);
    let dropped = Arc::new(AtomicU64::new(0));

    let session = TouchSession::new(engine, layout, injector, feedback_tx, Arc::clone(&dropped));
    let id = session.id;
    let join = tokio::spawn(session.run(command_rx));

    let handle = SessionHandle {
        id,
        commands: command_tx,
        dropped,
    };
    (handle, join, feedback_rx)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
