// Error types for the audio player
use thiserror::Error;

/// Errors reported by control-thread operations
#[derive(Error, Debug)]
pub enum PlayerError {
    /// File could not be opened or probed as audio
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Container has no decodable audio track
    #[error("No audio track found")]
    NoAudioTrack,

    /// Source properties the output stream cannot represent
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// No output device available
    #[error("No output device available")]
    NoOutputDevice,

    /// Output backend failed to build, start or stop a stream
    #[error("Audio output error: {0}")]
    Backend(String),

    /// start() called with no open stream
    #[error("No stream is open")]
    NoStream,

    /// Settings could not be read, parsed or written
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using PlayerError
pub type Result<T> = std::result::Result<T, PlayerError>;
