//! Mock sample source for unit testing.
//!
//! Allows tests to push synthetic [`SampleFrame`]s without a camera.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use super::{SampleFrame, SampleSource, SourceError};

/// A [`SampleSource`] whose frames are injected by the test.
pub struct MockSampleSource {
    sender: Arc<Mutex<Option<Sender<SampleFrame>>>>,
    injected: Arc<Mutex<u64>>,
}

impl MockSampleSource {
    pub fn new() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            injected: Arc::new(Mutex::new(0)),
        }
    }

    /// Pushes a frame, as if the detector had produced it.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub fn inject_frame(&self, frame: SampleFrame) {
        let guard = self.sender.lock().expect("lock poisoned");
        if let Some(ref sender) = *guard {
            sender
                .send(frame)
                .expect("receiver has been dropped; call start() first");
            *self.injected.lock().expect("lock poisoned") += 1;
        } else {
            panic!("MockSampleSource::inject_frame called before start()");
        }
    }

    /// Number of frames injected so far.
    pub fn injected_count(&self) -> u64 {
        *self.injected.lock().expect("lock poisoned")
    }
}

impl Default for MockSampleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for MockSampleSource {
    fn start(&self) -> Result<mpsc::Receiver<SampleFrame>, SourceError> {
        let (tx, rx) = mpsc::channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Dropping the sender closes the channel.
        *self.sender.lock().expect("lock poisoned") = None;
    }
}
