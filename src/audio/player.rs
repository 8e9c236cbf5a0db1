// Audio player implementation
// Owns one source and one output stream, and feeds the stream's callback

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::output::{
    CallbackResult, CpalBackend, OutputBackend, OutputStream, StreamParams,
    DEFAULT_FRAMES_PER_BUFFER,
};
use super::source::{AudioSource, DecodedSource, SourceInfo};
use crate::error::{PlayerError, Result};

/// Playback state shared between the control thread and the audio callback
struct PlaybackState {
    source: Option<Box<dyn AudioSource>>,
    /// Read cursor in frames
    position: u64,
    /// Cleared by stop() so a late callback cannot move the cursor
    running: bool,
}

type SharedState = Arc<Mutex<PlaybackState>>;

fn empty_state() -> SharedState {
    Arc::new(Mutex::new(PlaybackState {
        source: None,
        position: 0,
        running: false,
    }))
}

/// Stream-side options for a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOptions {
    /// None = device default buffer size
    pub frames_per_buffer: Option<u32>,
    /// Fill the rest of the period from the start when a looped source ends
    pub gapless_loop: bool,
    /// None = default output device
    pub device: Option<String>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            frames_per_buffer: Some(DEFAULT_FRAMES_PER_BUFFER),
            gapless_loop: true,
            device: None,
        }
    }
}

/// The sample-producing side of a player, moved into the output stream.
///
/// `produce` runs on the audio thread: it only try-locks, copies memory and
/// never allocates.
pub struct SampleProducer {
    shared: SharedState,
    looping: Arc<AtomicBool>,
    gapless_loop: bool,
}

impl SampleProducer {
    /// Fill one callback period of interleaved samples
    pub fn produce(&mut self, output: &mut [f32]) -> CallbackResult {
        let Some(mut guard) = self.shared.try_lock() else {
            // Control thread is mid-update, skip this period
            output.fill(0.0);
            return CallbackResult::Continue;
        };
        let state = &mut *guard;

        let Some(source) = state.source.as_mut() else {
            output.fill(0.0);
            return CallbackResult::Abort;
        };

        if !state.running {
            output.fill(0.0);
            return CallbackResult::Continue;
        }

        let channels = source.channels();
        let total = source.frame_count();
        let frames = output.len() / channels;
        let period = &mut output[..frames * channels];

        source.seek(state.position);
        let mut written = source.read(period);
        state.position += written as u64;

        let mut result = CallbackResult::Continue;
        if state.position >= total {
            if self.looping.load(Ordering::Relaxed) {
                state.position = 0;
                if self.gapless_loop && total > 0 {
                    while written < frames {
                        source.seek(state.position);
                        let n = source.read(&mut period[written * channels..]);
                        if n == 0 {
                            break;
                        }
                        written += n;
                        state.position += n as u64;
                        if state.position >= total {
                            state.position = 0;
                        }
                    }
                }
            } else {
                result = CallbackResult::Complete;
            }
        }

        output[written * channels..].fill(0.0);
        result
    }
}

/// Plays one audio file at a time through an output backend.
///
/// Lifecycle: `open` builds the source and a stopped stream, `start` begins
/// playback, `stop` rewinds, `close` releases everything. Dropping the player
/// closes it.
pub struct AudioPlayer<B: OutputBackend = CpalBackend> {
    backend: B,
    options: PlayerOptions,
    stream: Option<B::Stream>,
    shared: SharedState,
    looping: Arc<AtomicBool>,
}

impl AudioPlayer<CpalBackend> {
    /// Player on the default cpal host
    pub fn new(options: PlayerOptions) -> Self {
        Self::with_backend(CpalBackend::new(), options)
    }
}

impl<B: OutputBackend> AudioPlayer<B> {
    pub fn with_backend(backend: B, options: PlayerOptions) -> Self {
        Self {
            backend,
            options,
            stream: None,
            shared: empty_state(),
            looping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    /// Decode `path` and build a stopped stream for it.
    /// On failure the player is left closed.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.close();

        let source = DecodedSource::open(path)?;
        self.open_source(Box::new(source))?;

        info!("Opened {}", path.display());
        Ok(())
    }

    /// Build a stopped stream for an already constructed source.
    /// On failure the player is left closed.
    pub fn open_source(&mut self, source: Box<dyn AudioSource>) -> Result<()> {
        self.close();

        let info = SourceInfo::of(&*source);
        let channels = u16::try_from(info.channels)
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| {
                PlayerError::UnsupportedSource(format!("{} channels", info.channels))
            })?;

        let params = StreamParams {
            channels,
            sample_rate: info.sample_rate,
            frames_per_buffer: self.options.frames_per_buffer,
            device: self.options.device.clone(),
        };

        // Fresh state per stream: an old callback can never see a new source
        let shared = Arc::new(Mutex::new(PlaybackState {
            source: Some(source),
            position: 0,
            running: false,
        }));
        let producer = SampleProducer {
            shared: shared.clone(),
            looping: self.looping.clone(),
            gapless_loop: self.options.gapless_loop,
        };

        let stream = self.backend.build_stream(&params, producer)?;
        self.shared = shared;
        self.stream = Some(stream);

        debug!(
            "Stream ready: {} frames, {} channels, {} Hz",
            info.frame_count, info.channels, info.sample_rate
        );
        Ok(())
    }

    /// Begin invoking the callback. Fails with `NoStream` if nothing is open.
    pub fn start(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(PlayerError::NoStream)?;
        // Running before the stream starts so the first period is not silent
        self.shared.lock().running = true;
        if let Err(e) = stream.start() {
            self.shared.lock().running = false;
            return Err(e);
        }
        Ok(())
    }

    /// Deactivate the stream (if any) and rewind to the first frame
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.stop() {
                warn!("Failed to stop stream: {}", e);
            }
        }
        let mut state = self.shared.lock();
        state.running = false;
        state.position = 0;
    }

    /// Stop, then release the stream and the source
    pub fn close(&mut self) {
        self.stop();
        if self.stream.take().is_some() {
            debug!("Stream released");
        }
        self.shared.lock().source = None;
    }

    /// True while the stream is started and has not completed
    pub fn is_active(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    /// Whether playback restarts from the first frame at the end
    pub fn looping(&self) -> bool {
        self.looping.load(Ordering::Relaxed)
    }

    /// Takes effect at the next end-of-source check
    pub fn set_looping(&self, value: bool) {
        self.looping.store(value, Ordering::Relaxed);
    }

    /// Current read cursor in frames
    pub fn position(&self) -> u64 {
        self.shared.lock().position
    }

    /// Properties of the open source, if any
    pub fn source_info(&self) -> Option<SourceInfo> {
        self.shared
            .lock()
            .source
            .as_deref()
            .map(SourceInfo::of)
    }
}

impl<B: OutputBackend> Drop for AudioPlayer<B> {
    fn drop(&mut self) {
        self.close();
    }
}
