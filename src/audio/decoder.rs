// Audio decoder using Symphonia
// Decodes audio files to interleaved f32 frames

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::{PlayerError, Result};

pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    n_frames: Option<u64>,
    sample_spec: Option<SignalSpec>,
    sample_buf: Option<SampleBuffer<f32>>,
}

impl AudioDecoder {
    /// Open an audio file and prepare for decoding
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| PlayerError::Decode(format!("Failed to open {}: {}", path.display(), e)))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint using the file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| PlayerError::Decode(format!("Failed to probe file format: {}", e)))?;

        let format = probed.format;

        // First decodable audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(PlayerError::NoAudioTrack)?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);
        let n_frames = track.codec_params.n_frames;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlayerError::Decode(format!("Failed to create decoder: {}", e)))?;

        debug!(
            "Opened {} (track {}, {} Hz, {} channels, {:?} frames)",
            path.display(),
            track_id,
            sample_rate,
            channels,
            n_frames
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            n_frames,
            sample_spec: None,
            sample_buf: None,
        })
    }

    /// Sample rate of the audio. Updated from the decoded signal once decoding starts.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels. Updated from the decoded signal once decoding starts.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frame count reported by the container, if any
    pub fn n_frames(&self) -> Option<u64> {
        self.n_frames
    }

    /// Decode the next packet and append its interleaved f32 samples to `out`.
    /// Returns the number of frames appended, or None at end of stream.
    pub fn decode_next(&mut self, out: &mut Vec<f32>) -> Result<Option<usize>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(PlayerError::Decode(format!("Failed to read packet: {}", e))),
            };

            // Skip packets from other tracks
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
                Err(e) => return Err(PlayerError::Decode(format!("Decode failed: {}", e))),
            };

            let frames = decoded.frames();
            if frames == 0 {
                continue;
            }

            let spec = *decoded.spec();
            let channels = spec.channels.count();
            let too_small = self
                .sample_buf
                .as_ref()
                .map_or(true, |b| b.capacity() < decoded.capacity() * channels);
            if too_small || self.sample_spec != Some(spec) {
                self.sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                self.sample_spec = Some(spec);
            }

            self.channels = channels;
            self.sample_rate = spec.rate;

            if let Some(buf) = self.sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                out.extend_from_slice(buf.samples());
            }

            return Ok(Some(frames));
        }
    }
}
