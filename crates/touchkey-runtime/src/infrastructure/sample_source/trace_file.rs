//! Replays a recorded trace file as a sample source.
//!
//! Frames are read on a background thread and delivered as fast as the
//! consumer takes them; timestamps come from the trace, re-based on the
//! moment the source was opened, so replay decisions do not depend on replay
//! speed.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Instant;

use tracing::{debug, warn};
use touchkey_core::TraceReader;

use super::{SampleFrame, SampleSource, SourceError};

/// A [`SampleSource`] backed by a `.tktr` trace file.
pub struct TraceFileSource {
    path: PathBuf,
    reader: Mutex<Option<TraceReader<BufReader<File>>>>,
    base: Instant,
    running: Arc<AtomicBool>,
}

impl TraceFileSource {
    /// Opens `path` and checks the trace header.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] if the file cannot be opened and
    /// [`SourceError::Trace`] if the header is invalid.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = TraceReader::new(BufReader::new(file))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: Mutex::new(Some(reader)),
            base: Instant::now(),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for TraceFileSource {
    fn start(&self) -> Result<mpsc::Receiver<SampleFrame>, SourceError> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| SourceError::AlreadyStarted)?
            .take()
            .ok_or(SourceError::AlreadyStarted)?;

        let (tx, rx) = mpsc::channel();
        let base = self.base;
        let running = Arc::clone(&self.running);
        let path = self.path.clone();
        running.store(true, Ordering::Relaxed);

        thread::spawn(move || {
            let mut delivered = 0u64;
            for frame in reader {
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                match frame {
                    Ok(frame) => {
                        let item = SampleFrame {
                            sample: frame.to_sample(base),
                            hand_detected: frame.hand_detected,
                        };
                        if tx.send(item).is_err() {
                            break;
                        }
                        delivered += 1;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), delivered, "trace replay stopped: {e}");
                        break;
                    }
                }
            }
            debug!(path = %path.display(), delivered, "trace replay finished");
        });

        Ok(rx)
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
