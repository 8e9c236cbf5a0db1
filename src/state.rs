// Application state management
use crate::audio::{AudioPlayer, CpalBackend, OutputBackend};
use crate::settings::PlayerSettings;

/// Everything a host needs between calls.
///
/// Built when the host loads the player and dropped when it unloads; dropping
/// closes any open stream.
pub struct AppState<B: OutputBackend = CpalBackend> {
    pub player: AudioPlayer<B>,
    pub settings: PlayerSettings,
}

impl AppState<CpalBackend> {
    pub fn new(settings: PlayerSettings) -> Self {
        Self::with_backend(CpalBackend::new(), settings)
    }
}

impl<B: OutputBackend> AppState<B> {
    pub fn with_backend(backend: B, settings: PlayerSettings) -> Self {
        let player = AudioPlayer::with_backend(backend, settings.player_options());
        player.set_looping(settings.playback.loop_by_default);
        Self { player, settings }
    }
}
