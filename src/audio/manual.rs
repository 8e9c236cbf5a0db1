// Pull-driven output backend
// The caller decides when each callback period runs, e.g. for offline rendering

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::output::{CallbackResult, OutputBackend, OutputStream, StreamParams};
use super::player::SampleProducer;
use crate::error::{PlayerError, Result};

/// One rendered callback period
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// Interleaved samples, `frames * channels` long
    pub samples: Vec<f32>,
    pub result: CallbackResult,
}

/// Backend whose streams only run when `ManualStream::pull` is called.
///
/// Clones share the list of streams built so far.
#[derive(Clone, Default)]
pub struct ManualBackend {
    streams: Arc<Mutex<Vec<ManualStream>>>,
    fail_next: Arc<AtomicBool>,
    fail_next_start: Arc<AtomicBool>,
}

impl ManualBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `build_stream` call fail
    pub fn fail_next_build(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Make the next `start` on any of this backend's streams fail
    pub fn fail_next_start(&self) {
        self.fail_next_start.store(true, Ordering::SeqCst);
    }

    /// The most recently built stream
    pub fn last_stream(&self) -> Option<ManualStream> {
        self.streams.lock().last().cloned()
    }

    /// Number of streams built so far
    pub fn stream_count(&self) -> usize {
        self.streams.lock().len()
    }
}

impl OutputBackend for ManualBackend {
    type Stream = ManualStream;

    fn build_stream(&self, params: &StreamParams, producer: SampleProducer) -> Result<ManualStream> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PlayerError::Backend("injected build failure".to_string()));
        }

        let stream = ManualStream {
            inner: Arc::new(Mutex::new(ManualInner {
                params: params.clone(),
                producer,
                active: false,
                callbacks: 0,
                frames_pulled: 0,
            })),
            fail_next_start: self.fail_next_start.clone(),
        };
        self.streams.lock().push(stream.clone());
        Ok(stream)
    }
}

struct ManualInner {
    params: StreamParams,
    producer: SampleProducer,
    active: bool,
    callbacks: usize,
    frames_pulled: u64,
}

/// Handle to a manually driven stream. Clones refer to the same stream.
#[derive(Clone)]
pub struct ManualStream {
    inner: Arc<Mutex<ManualInner>>,
    fail_next_start: Arc<AtomicBool>,
}

impl ManualStream {
    pub fn params(&self) -> StreamParams {
        self.inner.lock().params.clone()
    }

    /// Run one callback period of `frames` frames.
    /// Returns None without invoking the producer if the stream is not active.
    pub fn pull(&self, frames: usize) -> Option<Period> {
        let mut inner = self.inner.lock();
        if !inner.active {
            return None;
        }

        let channels = inner.params.channels as usize;
        let mut samples = vec![0.0f32; frames * channels];
        let result = inner.producer.produce(&mut samples);

        inner.callbacks += 1;
        inner.frames_pulled += frames as u64;
        if result != CallbackResult::Continue {
            inner.active = false;
        }

        Some(Period { samples, result })
    }

    /// Number of times the producer has been invoked
    pub fn callback_count(&self) -> usize {
        self.inner.lock().callbacks
    }

    /// Total frames requested from the producer
    pub fn frames_pulled(&self) -> u64 {
        self.inner.lock().frames_pulled
    }
}

impl OutputStream for ManualStream {
    fn start(&mut self) -> Result<()> {
        if self.fail_next_start.swap(false, Ordering::SeqCst) {
            return Err(PlayerError::Backend("injected start failure".to_string()));
        }
        self.inner.lock().active = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.inner.lock().active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.inner.lock().active
    }
}
