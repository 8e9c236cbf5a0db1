// Audio playback module
// Uses Symphonia for decoding and cpal for output

pub mod decoder;
pub mod manual;
pub mod output;
pub mod player;
pub mod source;

pub use output::{CallbackResult, CpalBackend, OutputBackend, OutputStream, StreamParams};
pub use player::{AudioPlayer, PlayerOptions, SampleProducer};
pub use source::{AudioSource, DecodedSource, SourceInfo};
