// Audio output using cpal
// A stream pulls one callback period at a time from a SampleProducer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleRate, Stream, StreamConfig};
use tracing::{debug, error, info, warn};

use super::player::SampleProducer;
use crate::error::{PlayerError, Result};

/// Frames requested per callback unless configured otherwise
pub const DEFAULT_FRAMES_PER_BUFFER: u32 = 64;

/// What the producer asks the stream to do after a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackResult {
    /// Keep invoking the callback
    Continue,
    /// Source finished; deactivate after this period
    Complete,
    /// Deactivate immediately; the period may be incomplete
    Abort,
}

/// Parameters for building an output stream. Samples are always interleaved f32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    pub channels: u16,
    pub sample_rate: u32,
    /// None = device default buffer size
    pub frames_per_buffer: Option<u32>,
    /// None = default output device
    pub device: Option<String>,
}

/// Something that can open real-time output streams
pub trait OutputBackend {
    type Stream: OutputStream;

    /// Build a stream that is not yet playing
    fn build_stream(&self, params: &StreamParams, producer: SampleProducer) -> Result<Self::Stream>;
}

/// A built output stream.
///
/// Once `Complete` or `Abort` is returned by the producer the stream deactivates
/// itself and stops invoking it until started again.
pub trait OutputStream {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Started and not yet completed, aborted or stopped
    fn is_active(&self) -> bool;
}

/// Output backend for the platform's default cpal host
pub struct CpalBackend {
    host: cpal::Host,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List available output device names
    pub fn list_devices(&self) -> Result<Vec<String>> {
        let devices = self
            .host
            .output_devices()
            .map_err(|e| PlayerError::Backend(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();
        Ok(devices)
    }

    fn find_device(&self, name: Option<&str>) -> Result<Device> {
        if let Some(name) = name {
            let found = self
                .host
                .output_devices()
                .map_err(|e| PlayerError::Backend(format!("Failed to enumerate devices: {}", e)))?
                .find(|d| d.name().ok().as_deref() == Some(name));

            match found {
                Some(device) => return Ok(device),
                None => warn!("Output device '{}' not found, falling back to default device", name),
            }
        }

        self.host
            .default_output_device()
            .ok_or(PlayerError::NoOutputDevice)
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for CpalBackend {
    type Stream = CpalStream;

    fn build_stream(&self, params: &StreamParams, mut producer: SampleProducer) -> Result<CpalStream> {
        let device = self.find_device(params.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let config = StreamConfig {
            channels: params.channels,
            sample_rate: SampleRate(params.sample_rate),
            buffer_size: match params.frames_per_buffer {
                Some(frames) => BufferSize::Fixed(frames),
                None => BufferSize::Default,
            },
        };

        let activity = Arc::new(StreamActivity::new());
        let activity_cb = activity.clone();
        let activity_err = activity.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if activity_cb.is_finished() {
                        data.fill(0.0);
                        return;
                    }
                    activity_cb.record(producer.produce(data));
                },
                move |err| {
                    error!("Audio output error: {}", err);
                    if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                        activity_err.finish();
                    }
                },
                None,
            )
            .map_err(|e| PlayerError::Backend(format!("Failed to build output stream: {}", e)))?;

        // Some hosts start streams as soon as they are built
        if let Err(e) = stream.pause() {
            debug!("Could not pause freshly built stream: {}", e);
        }

        info!(
            "Built output stream on '{}': {} Hz, {} channels, buffer {:?}",
            device_name, params.sample_rate, params.channels, config.buffer_size
        );

        Ok(CpalStream { stream, activity })
    }
}

/// Whether a stream is producing audio.
///
/// `playing` is set by the control thread; `finished` by the audio thread when
/// the producer completes or aborts, or by the error callback when the device
/// goes away.
#[derive(Debug, Default)]
pub struct StreamActivity {
    playing: AtomicBool,
    finished: AtomicBool,
}

impl StreamActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Control thread is about to start the stream
    pub fn start(&self) {
        self.finished.store(false, Ordering::Release);
        self.playing.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.playing.store(false, Ordering::Release);
    }

    /// Stream can no longer produce audio until started again
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// Apply what the producer asked for after a period
    pub fn record(&self, result: CallbackResult) {
        if result != CallbackResult::Continue {
            self.finish();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.playing.load(Ordering::Acquire) && !self.is_finished()
    }
}

pub struct CpalStream {
    stream: Stream,
    activity: Arc<StreamActivity>,
}

impl OutputStream for CpalStream {
    fn start(&mut self) -> Result<()> {
        self.activity.start();
        if let Err(e) = self.stream.play() {
            self.activity.stop();
            return Err(PlayerError::Backend(format!("Failed to start stream: {}", e)));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.activity.stop();
        self.stream
            .pause()
            .map_err(|e| PlayerError::Backend(format!("Failed to stop stream: {}", e)))
    }

    fn is_active(&self) -> bool {
        self.activity.is_active()
    }
}
