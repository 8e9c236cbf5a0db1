// Host command handlers
// Each command reports success as a bool; errors are logged here and go no further
use std::path::Path;

use tracing::{info, warn};

use crate::audio::OutputBackend;
use crate::state::AppState;

/// Open `file_path` and start playing it. Returns whether the file opened.
pub fn play_audio<B: OutputBackend>(state: &mut AppState<B>, file_path: &Path) -> bool {
    if let Err(e) = state.player.open(file_path) {
        warn!("Failed to open {}: {}", file_path.display(), e);
        return false;
    }

    // Opening is what the caller asked about; a start failure is only logged
    if let Err(e) = state.player.start() {
        warn!("Failed to start playback of {}: {}", file_path.display(), e);
        return true;
    }

    info!("Playing {}", file_path.display());
    true
}

/// Stop playback and release the file. Returns true once nothing is playing.
pub fn stop_audio<B: OutputBackend>(state: &mut AppState<B>) -> bool {
    state.player.close();
    !state.player.is_active()
}

pub fn is_active_audio<B: OutputBackend>(state: &AppState<B>) -> bool {
    state.player.is_active()
}

/// Set whether playback repeats
pub fn loop_audio<B: OutputBackend>(state: &AppState<B>, enabled: bool) -> bool {
    state.player.set_looping(enabled);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::manual::ManualBackend;
    use crate::settings::PlayerSettings;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_tone(path: &Path, frames: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(if i % 2 == 0 { 8000i16 } else { -8000 }).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn state() -> AppState<ManualBackend> {
        AppState::with_backend(ManualBackend::new(), PlayerSettings::default())
    }

    #[test]
    fn test_play_opens_and_starts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 1000);

        let mut state = state();
        assert!(play_audio(&mut state, &path));
        assert!(is_active_audio(&state));
    }

    #[test]
    fn test_play_missing_file_reports_false() {
        let mut state = state();
        assert!(!play_audio(&mut state, Path::new("/no/such/file.wav")));
        assert!(!is_active_audio(&state));
    }

    #[test]
    fn test_play_reports_open_even_if_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 1000);

        let mut state = state();
        state.player.backend().fail_next_start();
        assert!(play_audio(&mut state, &path));
        assert!(!is_active_audio(&state));
        assert!(state.player.source_info().is_some());
    }

    #[test]
    fn test_stop_reports_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 1000);

        let mut state = state();
        play_audio(&mut state, &path);
        assert!(stop_audio(&mut state));
        assert!(!is_active_audio(&state));
        assert!(state.player.source_info().is_none());

        // Stopping again is harmless
        assert!(stop_audio(&mut state));
    }

    #[test]
    fn test_loop_sets_flag() {
        let state = state();
        assert!(loop_audio(&state, true));
        assert!(state.player.looping());
        assert!(loop_audio(&state, false));
        assert!(!state.player.looping());
    }

    #[test]
    fn test_loop_by_default_setting() {
        let mut settings = PlayerSettings::default();
        settings.playback.loop_by_default = true;
        let state = AppState::with_backend(ManualBackend::new(), settings);
        assert!(state.player.looping());
    }
}
