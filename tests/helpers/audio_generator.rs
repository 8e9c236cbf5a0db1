//! WAV fixture generation
//!
//! Deterministic files with known lengths so frame accounting can be checked
//! exactly.

use hound::{WavSpec, WavWriter};
use std::path::Path;

/// Amplitude of the single non-zero frame in a click file
pub const CLICK_AMPLITUDE: f32 = 0.5;

fn spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Silent 16-bit WAV of exactly `frames` frames
pub fn write_silent_wav<P: AsRef<Path>>(
    path: P,
    frames: u32,
    channels: u16,
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec(channels, sample_rate))?;
    for _ in 0..frames * channels as u32 {
        writer.write_sample(0i16)?;
    }
    writer.finalize()
}

/// Mono 44.1 kHz WAV with one click on frame 0 followed by silence
pub fn write_click_wav<P: AsRef<Path>>(path: P, frames: u32) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec(1, 44100))?;
    let click = (CLICK_AMPLITUDE * 32768.0) as i16;
    for i in 0..frames {
        writer.write_sample(if i == 0 { click } else { 0i16 })?;
    }
    writer.finalize()
}
