use std::path::Path;

use crate::audio::AudioEngine;
use crate::config::{self, RepeatModeSetting};
use crate::library::{self, ManifestError, Track};
use crate::player::{PlaybackController, RepeatMode};

/// Seed the session from `[playback]`. Runs before the first queue is set so
/// a configured shuffle applies to it.
pub fn apply_playback_defaults<E: AudioEngine>(
    controller: &mut PlaybackController<E>,
    settings: &config::PlaybackSettings,
) {
    controller.set_volume(settings.volume);
    controller.set_repeat_mode(match settings.repeat {
        RepeatModeSetting::None => RepeatMode::None,
        RepeatModeSetting::One => RepeatMode::One,
        RepeatModeSetting::All => RepeatMode::All,
    });
    if settings.shuffle != controller.shuffle() {
        controller.toggle_shuffle();
    }
}

/// A `.toml` file is read as a playlist manifest; anything else is scanned
/// as a directory.
pub fn load_tracks(
    source: &Path,
    settings: &config::LibrarySettings,
) -> Result<Vec<Track>, ManifestError> {
    let is_manifest = source.is_file()
        && source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    if is_manifest {
        library::load_manifest(source, settings)
    } else {
        Ok(library::scan(source, settings))
    }
}
