//! TOML playlist manifests.
//!
//! ```toml
//! [[track]]
//! id = "0xabc:1"
//! title = "Night Drive"
//! artist = "Kilo"
//! locator = "audio/night-drive.mp3"
//! duration_secs = 212.5
//! creator = "0x51f2..."
//! content_id = "bafybeigd..."
//! likes = 12
//! ```
//!
//! Relative locators resolve against the manifest's directory. A missing
//! `id` falls back to `content_id`, then to the entry's position.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::LibrarySettings;

use super::display::{DisplayParts, display_from_fields};
use super::model::{Track, TrackId};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read playlist {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid playlist {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate track id {0:?} in playlist")]
    DuplicateId(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManifestFile {
    #[serde(rename = "track")]
    tracks: Vec<ManifestTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManifestTrack {
    id: Option<String>,
    title: String,
    artist: Option<String>,
    album: Option<String>,
    locator: Option<String>,
    duration_secs: Option<f64>,
    creator: Option<String>,
    content_id: Option<String>,
    likes: u64,
}

/// Read a playlist manifest into queue-ready tracks, preserving file order.
pub fn load_manifest(path: &Path, settings: &LibrarySettings) -> Result<Vec<Track>, ManifestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ManifestFile = toml::from_str(&raw).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let mut seen = HashSet::new();
    let mut tracks = Vec::with_capacity(file.tracks.len());

    for (i, entry) in file.tracks.into_iter().enumerate() {
        let id = entry
            .id
            .clone()
            .or_else(|| entry.content_id.clone())
            .unwrap_or_else(|| format!("track-{}", i + 1));
        if !seen.insert(id.clone()) {
            return Err(ManifestError::DuplicateId(id));
        }
        tracks.push(into_track(entry, TrackId::new(id), base, settings));
    }

    Ok(tracks)
}

fn into_track(entry: ManifestTrack, id: TrackId, base: &Path, settings: &LibrarySettings) -> Track {
    let locator = entry
        .locator
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .map(|l| resolve_relative(&l, base));

    let title = if entry.title.trim().is_empty() {
        id.to_string()
    } else {
        entry.title.trim().to_string()
    };

    let duration = entry
        .duration_secs
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(Duration::from_secs_f64);

    let display = display_from_fields(
        &DisplayParts {
            title: &title,
            artist: entry.artist.as_deref(),
            album: entry.album.as_deref(),
            creator: entry.creator.as_deref(),
            source: locator.as_deref().map(Path::new),
        },
        &settings.display_fields,
        &settings.display_separator,
    );

    Track {
        id,
        title,
        artist: entry.artist,
        album: entry.album,
        locator,
        duration,
        creator: entry.creator,
        content_id: entry.content_id,
        likes: entry.likes,
        display,
    }
}

fn resolve_relative(locator: &str, base: &Path) -> String {
    if locator.contains("://") || Path::new(locator).is_absolute() {
        locator.to_string()
    } else {
        base.join(locator).to_string_lossy().into_owned()
    }
}
