// Audio Player - plays one sound file at a time for a controlling host
// Module declarations
pub mod audio;
pub mod commands;
pub mod error;
pub mod settings;
pub mod state;

pub use audio::{AudioPlayer, PlayerOptions};
pub use error::{PlayerError, Result};
pub use settings::PlayerSettings;
pub use state::AppState;
