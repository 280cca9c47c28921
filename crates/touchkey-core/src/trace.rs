//! Binary trace files for recording and replaying hand-sample streams.
//!
//! File format:
//! ```text
//! [magic:4 = "TKTR"][version:1][reserved:3]
//! [len:4][bincode(TraceFrame):len]
//! [len:4][bincode(TraceFrame):len]
//! ...
//! ```
//! The header is 8 bytes.  Frame lengths are big-endian.  A file that ends
//! exactly on a frame boundary is complete; anything else is truncated.
//!
//! Timestamps are stored as microsecond offsets from the start of the trace so
//! a replay can rebuild `Instant`s relative to any base.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::geometry::Point;
use crate::domain::sample::HandSample;

/// File magic.
pub const TRACE_MAGIC: [u8; 4] = *b"TKTR";
/// Current trace format version.
pub const TRACE_VERSION: u8 = 1;
/// Header size in bytes.
pub const TRACE_HEADER_SIZE: usize = 8;
/// Upper bound on one encoded frame; anything larger is treated as corruption.
pub const MAX_FRAME_LEN: u32 = 4096;

/// Errors that can occur while reading or writing a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The file does not start with `TKTR`.
    #[error("not a trace file: bad magic {0:02X?}")]
    BadMagic([u8; 4]),

    /// The header names a version this build cannot read.
    #[error("unsupported trace version: {0}")]
    UnsupportedVersion(u8),

    /// The data ended inside the header or a frame.
    #[error("truncated trace: expected {expected} bytes, got {available}")]
    Truncated { expected: usize, available: usize },

    /// A frame length prefix exceeds [`MAX_FRAME_LEN`].
    #[error("trace frame of {0} bytes exceeds the limit")]
    FrameTooLarge(u32),

    /// A frame body could not be encoded or decoded.
    #[error("trace frame codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("trace I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub fingertip: Point,
    pub shadow_tip: Point,
    pub confidence: f64,
    pub frame_number: u64,
    /// Microseconds since the start of the trace.
    pub offset_us: u64,
    /// The detector's hand-present verdict for this frame.
    pub hand_detected: bool,
}

impl TraceFrame {
    /// Records `sample`, measuring its timestamp relative to `base`.
    ///
    /// Samples captured before `base` get offset 0.
    pub fn from_sample(sample: &HandSample, base: Instant, hand_detected: bool) -> Self {
        Self {
            fingertip: sample.fingertip,
            shadow_tip: sample.shadow_tip,
            confidence: sample.detection_confidence,
            frame_number: sample.frame_number,
            offset_us: sample.timestamp.saturating_duration_since(base).as_micros() as u64,
            hand_detected,
        }
    }

    /// Rebuilds the sample with its timestamp placed relative to `base`.
    pub fn to_sample(&self, base: Instant) -> HandSample {
        HandSample::new(
            self.fingertip,
            self.shadow_tip,
            self.confidence,
            self.frame_number,
            base + Duration::from_micros(self.offset_us),
        )
    }
}

// ── Writer ────────────────────────────────────────────────────────────────────

/// Streams frames to any [`Write`] sink.
///
/// The header is written by [`TraceWriter::new`].
pub struct TraceWriter<W: Write> {
    inner: W,
    frames_written: u64,
}

impl<W: Write> TraceWriter<W> {
    /// Writes the trace header and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the header cannot be written.
    pub fn new(mut inner: W) -> Result<Self, TraceError> {
        let mut header = [0u8; TRACE_HEADER_SIZE];
        header[..4].copy_from_slice(&TRACE_MAGIC);
        header[4] = TRACE_VERSION;
        // bytes 5..8 are reserved
        inner.write_all(&header)?;
        Ok(Self {
            inner,
            frames_written: 0,
        })
    }

    /// Appends one frame.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] if encoding or the write fails.
    pub fn write_frame(&mut self, frame: &TraceFrame) -> Result<(), TraceError> {
        let body = bincode::serialize(frame)?;
        let len = body.len() as u32;
        if len > MAX_FRAME_LEN {
            return Err(TraceError::FrameTooLarge(len));
        }
        self.inner.write_all(&len.to_be_bytes())?;
        self.inner.write_all(&body)?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flushes and returns the underlying sink.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the flush fails.
    pub fn finish(mut self) -> Result<W, TraceError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Reads frames back from any [`Read`] source.
///
/// Iterating yields `Result<TraceFrame, TraceError>`; iteration stops after the
/// first error.
pub struct TraceReader<R: Read> {
    inner: R,
    failed: bool,
}

impl<R: Read> TraceReader<R> {
    /// Reads and checks the trace header.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Truncated`], [`TraceError::BadMagic`], or
    /// [`TraceError::UnsupportedVersion`] for an invalid header.
    pub fn new(mut inner: R) -> Result<Self, TraceError> {
        let mut header = [0u8; TRACE_HEADER_SIZE];
        let got = read_full(&mut inner, &mut header)?;
        if got < TRACE_HEADER_SIZE {
            return Err(TraceError::Truncated {
                expected: TRACE_HEADER_SIZE,
                available: got,
            });
        }

        let magic = [header[0], header[1], header[2], header[3]];
        if magic != TRACE_MAGIC {
            return Err(TraceError::BadMagic(magic));
        }
        if header[4] != TRACE_VERSION {
            return Err(TraceError::UnsupportedVersion(header[4]));
        }
        // header[5..8] are reserved – ignored on read

        Ok(Self {
            inner,
            failed: false,
        })
    }

    /// Reads the next frame, or `Ok(None)` at a clean end of file.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] for a truncated, oversized, or undecodable frame.
    pub fn read_frame(&mut self) -> Result<Option<TraceFrame>, TraceError> {
        let mut len_buf = [0u8; 4];
        let got = read_full(&mut self.inner, &mut len_buf)?;
        if got == 0 {
            return Ok(None);
        }
        if got < len_buf.len() {
            return Err(TraceError::Truncated {
                expected: len_buf.len(),
                available: got,
            });
        }

        let len = u32::from_be_bytes(len_buf);
        if len > MAX_FRAME_LEN {
            return Err(TraceError::FrameTooLarge(len));
        }

        let mut body = vec![0u8; len as usize];
        let got = read_full(&mut self.inner, &mut body)?;
        if got < body.len() {
            return Err(TraceError::Truncated {
                expected: body.len(),
                available: got,
            });
        }
        Ok(Some(bincode::deserialize(&body)?))
    }
}

impl<R: Read> Iterator for TraceReader<R> {
    type Item = Result<TraceFrame, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_frame() {
            Ok(frame) => frame.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Fills as much of `buf` as the source provides, returning the byte count.
///
/// Unlike `read_exact` this distinguishes a clean end of file (0 bytes) from a
/// short read.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
