//! Test helpers for audio player integration tests
//!
//! WAV fixtures are written into a temporary directory per test.

pub mod audio_generator;

pub use audio_generator::{write_click_wav, write_silent_wav, CLICK_AMPLITUDE};
