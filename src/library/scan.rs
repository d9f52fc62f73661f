use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::{DisplayParts, display_from_fields};
use super::model::{Track, TrackId};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Walk `dir` and build a track for every audio file, sorted by display text.
///
/// Ids are the file paths relative to `dir`, so they stay stable across
/// rescans of the same tree.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file()
            || (!settings.include_hidden && is_hidden(path))
            || !is_audio_file(path, settings)
        {
            continue;
        }

        let mut title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let mut artist: Option<String> = None;
        let mut album: Option<String> = None;
        let mut duration: Option<Duration> = None;

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = non_blank(tag.title()) {
                        title = v;
                    }
                    artist = non_blank(tag.artist());
                    album = non_blank(tag.album());
                }
            }
            Err(e) => trace!(path = %path.display(), "no readable tags: {e}"),
        }

        let display = display_from_fields(
            &DisplayParts {
                title: &title,
                artist: artist.as_deref(),
                album: album.as_deref(),
                creator: None,
                source: Some(path),
            },
            &settings.display_fields,
            &settings.display_separator,
        );

        let id = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        tracks.push(Track {
            id: TrackId::new(id),
            title,
            artist,
            album,
            locator: Some(path.to_string_lossy().into_owned()),
            duration,
            creator: None,
            content_id: None,
            likes: 0,
            display,
        });
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    debug!(dir = %dir.display(), count = tracks.len(), "scanned library");
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackDisplayField;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_builds_ids_and_locators_and_sorts_by_display() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let settings = LibrarySettings {
            display_fields: vec![TrackDisplayField::Title],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "A");
        assert_eq!(tracks[0].id.as_str(), "A.ogg");
        let expected = dir.path().join("A.ogg").to_string_lossy().into_owned();
        assert_eq!(tracks[0].locator.as_deref(), Some(expected.as_str()));
        assert_eq!(tracks[1].display, "b");
        assert!(tracks.iter().all(|t| t.duration.is_none()));
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "visible");
    }

    #[test]
    fn scan_respects_recursive_false_and_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        let flat = LibrarySettings {
            recursive: false,
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let names: Vec<String> = scan(dir.path(), &flat)
            .into_iter()
            .map(|t| t.display)
            .collect();
        assert_eq!(names, vec!["root".to_string()]);

        // WalkDir counts the root as depth 0.
        let capped = LibrarySettings {
            max_depth: Some(2),
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &capped);
        let names: Vec<&str> = tracks.iter().map(|t| t.display.as_str()).collect();
        assert!(names.contains(&"root"));
        assert!(names.contains(&"one"));
        assert!(!names.contains(&"two"));

        let nested = tracks.iter().find(|t| t.display == "one").unwrap();
        assert_eq!(
            nested.id.as_str(),
            Path::new("d1").join("one.mp3").to_string_lossy()
        );
    }
}
