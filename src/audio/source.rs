// Seekable audio sources read by the playback callback
use std::path::Path;

use tracing::debug;

use super::decoder::AudioDecoder;
use crate::error::{PlayerError, Result};

/// A seekable source of interleaved f32 frames.
///
/// `seek` and `read` are called from the real-time audio thread and must not
/// block, allocate or perform I/O.
pub trait AudioSource: Send {
    /// Total length in frames
    fn frame_count(&self) -> u64;

    fn channels(&self) -> usize;

    fn sample_rate(&self) -> u32;

    /// Move the read cursor to an absolute frame, clamped to `frame_count`.
    /// Returns the resulting cursor.
    fn seek(&mut self, frame: u64) -> u64;

    /// Read up to `buf.len() / channels` frames into `buf` from the cursor.
    /// Returns the number of frames read; fewer than requested only at the end.
    fn read(&mut self, buf: &mut [f32]) -> usize;
}

/// Static properties of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub frame_count: u64,
    pub channels: usize,
    pub sample_rate: u32,
}

impl SourceInfo {
    pub fn of<S: AudioSource + ?Sized>(source: &S) -> Self {
        Self {
            frame_count: source.frame_count(),
            channels: source.channels(),
            sample_rate: source.sample_rate(),
        }
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frame_count * 1000 / self.sample_rate as u64
    }
}

/// A fully decoded file held in memory.
///
/// The whole file is decoded when opened, so the callback only copies memory.
/// Costs `frames * channels * 4` bytes; meant for short sounds.
pub struct DecodedSource {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
    cursor: usize,
}

impl DecodedSource {
    /// Decode an entire file
    pub fn open(path: &Path) -> Result<Self> {
        let mut decoder = AudioDecoder::open(path)?;

        let capacity = decoder
            .n_frames()
            .map(|n| n as usize * decoder.channels())
            .unwrap_or(0);
        let mut samples = Vec::with_capacity(capacity);

        while decoder.decode_next(&mut samples)?.is_some() {}

        let source = Self::from_samples(samples, decoder.channels(), decoder.sample_rate())?;
        debug!(
            "Decoded {} frames from {}",
            source.frame_count(),
            path.display()
        );
        Ok(source)
    }

    /// Wrap already decoded interleaved samples
    pub fn from_samples(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(PlayerError::UnsupportedSource("zero channels".to_string()));
        }
        if sample_rate == 0 {
            return Err(PlayerError::UnsupportedSource("zero sample rate".to_string()));
        }
        if samples.len() % channels != 0 {
            return Err(PlayerError::UnsupportedSource(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
            cursor: 0,
        })
    }

    /// Current read cursor in frames
    pub fn cursor(&self) -> u64 {
        self.cursor as u64
    }
}

impl AudioSource for DecodedSource {
    fn frame_count(&self) -> u64 {
        (self.samples.len() / self.channels) as u64
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn seek(&mut self, frame: u64) -> u64 {
        let frame = frame.min(self.frame_count());
        self.cursor = frame as usize;
        frame
    }

    fn read(&mut self, buf: &mut [f32]) -> usize {
        let start = self.cursor * self.channels;
        let available = self.samples.len() - start;
        let wanted = (buf.len() / self.channels) * self.channels;
        let len = wanted.min(available);

        buf[..len].copy_from_slice(&self.samples[start..start + len]);

        let frames = len / self.channels;
        self.cursor += frames;
        frames
    }
}
