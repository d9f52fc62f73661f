use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{info, warn};

use crate::audio::{RodioEngine, event_channel};
use crate::config;
use crate::logging;
use crate::player::PlaybackController;

mod event_loop;
mod keys;
mod settings;
mod startup;
mod status;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, warning) = settings::load_settings();
    logging::init(&settings.logging)?;
    if let Some(msg) = warning {
        warn!("{msg}");
    }
    if let Some(path) = config::resolve_config_path() {
        info!(path = %path.display(), "config file");
    }

    let source = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"));
    let tracks = startup::load_tracks(&source, &settings.library)?;
    info!(source = %source.display(), count = tracks.len(), "tracks loaded");

    let (events_tx, events_rx) = event_channel();
    let engine = RodioEngine::new(events_tx)?;
    let mut controller = PlaybackController::new(engine, events_rx, settings.preload.clone());
    startup::apply_playback_defaults(&mut controller, &settings.playback);
    controller.replace_queue(tracks);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    let run_result = event_loop::run(&mut stdout, &settings, &mut controller);

    if controller.is_playing() {
        controller
            .engine()
            .fade_out(Duration::from_millis(settings.playback.quit_fade_out_ms));
    }
    drop(controller);

    disable_raw_mode()?;
    println!();

    run_result
}
