//! audio-player - play a sound file from the command line
//!
//! Drives the same commands a host integration uses: play, poll is-active,
//! stop.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audio_player_lib::audio::CpalBackend;
use audio_player_lib::commands;
use audio_player_lib::{AppState, PlayerSettings};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Command-line arguments for audio-player
#[derive(Parser, Debug)]
#[command(name = "audio-player")]
#[command(about = "Play a sound file through the default output device")]
#[command(version)]
struct Args {
    /// Audio file to play
    #[arg(required_unless_present = "list_devices")]
    file: Option<PathBuf>,

    /// Print the available output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Repeat the file until the time limit (or forever)
    #[arg(short = 'l', long = "loop")]
    repeat: bool,

    /// Directory holding settings.json
    #[arg(short, long, env = "AUDIO_PLAYER_SETTINGS_DIR")]
    settings_dir: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(short, long, value_parser = parse_seconds)]
    max_seconds: Option<Duration>,
}

/// Non-negative, finite seconds
fn parse_seconds(value: &str) -> std::result::Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|e| format!("'{}' is not a number: {}", value, e))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| format!("'{}' is not a usable duration: {}", value, e))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audio_player=info,audio_player_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.list_devices {
        for name in CpalBackend::new()
            .list_devices()
            .context("Failed to list output devices")?
        {
            println!("{}", name);
        }
        return Ok(());
    }

    let Some(file) = args.file else {
        bail!("No audio file given");
    };

    let settings = match &args.settings_dir {
        Some(dir) => PlayerSettings::load(dir)
            .with_context(|| format!("Failed to load settings from {}", dir.display()))?,
        None => PlayerSettings::default(),
    };

    let mut state = AppState::new(settings);
    if args.repeat {
        commands::loop_audio(&state, true);
    }

    if !commands::play_audio(&mut state, &file) {
        bail!("Could not play {}", file.display());
    }

    if let Some(info) = state.player.source_info() {
        info!(
            "{}: {} ms, {} channels, {} Hz",
            file.display(),
            info.duration_ms(),
            info.channels,
            info.sample_rate
        );
    }

    let limit = args.max_seconds;
    let started = Instant::now();
    while commands::is_active_audio(&state) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            info!("Time limit reached");
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    commands::stop_audio(&mut state);
    info!("Done");
    Ok(())
}
