//! Hand-sample sources for the touch session.
//!
//! In a full deployment the source is the camera pipeline's fingertip and
//! shadow detector.  This crate ships the sources that need no camera:
//!
//! - [`trace_file::TraceFileSource`] replays a recorded `.tktr` trace.
//! - [`synthetic::SyntheticSource`] types a word on a layout with ideal
//!   fingertip/shadow geometry.
//! - [`mock::MockSampleSource`] lets tests push frames by hand.
//!
//! # Threading
//!
//! Sources deliver frames on a standard-library channel so they can run on
//! plain OS threads (camera callbacks usually do).  The consumer forwards them
//! into the async session with
//! `SessionHandle::blocking_send_sample` or `submit_sample`.

use std::sync::mpsc;

use thiserror::Error;
use touchkey_core::{HandSample, TraceError};

pub mod mock;
pub mod synthetic;
pub mod trace_file;

/// One frame as delivered by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFrame {
    pub sample: HandSample,
    /// The detector's verdict on whether a hand is visible at all.
    pub hand_detected: bool,
}

/// Error type for sample sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The trace could not be opened or read.
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    /// A file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A character has no key on the layout.
    #[error("no key for character {0:?} on this layout")]
    UnknownKey(char),

    /// The source has already been started.
    #[error("sample source already started")]
    AlreadyStarted,
}

/// Abstraction over anything that produces hand samples.
///
/// `start` hands back the receiving end of a channel; the source closes the
/// channel when it runs out of frames or when `stop` is called.
pub trait SampleSource: Send + Sync {
    /// Starts producing frames.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source cannot start.
    fn start(&self) -> Result<mpsc::Receiver<SampleFrame>, SourceError>;

    /// Stops producing frames and closes the channel.
    fn stop(&self);
}
