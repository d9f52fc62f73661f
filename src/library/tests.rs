use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use super::display::{DisplayParts, display_from_fields};
use super::*;
use crate::config::{LibrarySettings, TrackDisplayField};

fn parts<'a>(title: &'a str, artist: Option<&'a str>) -> DisplayParts<'a> {
    DisplayParts {
        title,
        artist,
        album: None,
        creator: None,
        source: Some(Path::new("/tmp/Song.mp3")),
    }
}

#[test]
fn display_from_fields_can_format_artist_title() {
    let fields = [TrackDisplayField::Artist, TrackDisplayField::Title];
    assert_eq!(
        display_from_fields(&parts("Song", Some("Artist")), &fields, " - "),
        "Artist - Song"
    );
    assert_eq!(
        display_from_fields(&parts("Song", Some("  Artist  ")), &fields, " - "),
        "Artist - Song"
    );
    assert_eq!(display_from_fields(&parts("Song", None), &fields, " - "), "Song");
}

#[test]
fn display_from_fields_uses_creator_and_filename() {
    let p = DisplayParts {
        title: "Song",
        artist: None,
        album: None,
        creator: Some("0xfeed"),
        source: Some(Path::new("/music/raw-take.wav")),
    };
    assert_eq!(
        display_from_fields(
            &p,
            &[TrackDisplayField::Creator, TrackDisplayField::Filename],
            " | "
        ),
        "0xfeed | raw-take"
    );
    // Nothing usable: title fallback.
    let bare = DisplayParts { source: None, creator: None, ..p };
    assert_eq!(
        display_from_fields(&bare, &[TrackDisplayField::Filename], " | "),
        "Song"
    );
}

#[test]
fn load_manifest_reads_tracks_in_order_and_resolves_locators() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlist.toml");
    fs::write(
        &path,
        r#"
[[track]]
id = "t-1"
title = "Night Drive"
artist = "Kilo"
locator = "audio/night.mp3"
duration_secs = 212.5
creator = "0x51f2"
content_id = "bafy-night"
likes = 12

[[track]]
title = "No Audio Yet"
content_id = "bafy-pending"

[[track]]
title = "Remote"
locator = "ipfs://bafy-remote/track.mp3"
"#,
    )
    .unwrap();

    let tracks = load_manifest(&path, &LibrarySettings::default()).unwrap();
    assert_eq!(tracks.len(), 3);

    let first = &tracks[0];
    assert_eq!(first.id.as_str(), "t-1");
    assert_eq!(first.display, "Kilo - Night Drive");
    assert_eq!(first.duration, Some(Duration::from_secs_f64(212.5)));
    assert_eq!(first.likes, 12);
    assert_eq!(first.creator.as_deref(), Some("0x51f2"));
    let expected = dir.path().join("audio/night.mp3").to_string_lossy().into_owned();
    assert_eq!(first.locator.as_deref(), Some(expected.as_str()));

    assert_eq!(tracks[1].id.as_str(), "bafy-pending");
    assert!(tracks[1].locator.is_none());

    assert_eq!(tracks[2].id.as_str(), "track-3");
    assert_eq!(
        tracks[2].locator.as_deref(),
        Some("ipfs://bafy-remote/track.mp3")
    );
}

#[test]
fn load_manifest_rejects_duplicate_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupes.toml");
    fs::write(
        &path,
        r#"
[[track]]
id = "same"
title = "A"

[[track]]
id = "same"
title = "B"
"#,
    )
    .unwrap();

    let err = load_manifest(&path, &LibrarySettings::default()).unwrap_err();
    assert!(matches!(err, ManifestError::DuplicateId(id) if id == "same"));
}

#[test]
fn load_manifest_reports_missing_and_malformed_files() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        load_manifest(&missing, &LibrarySettings::default()),
        Err(ManifestError::Io { .. })
    ));

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[[track]\ntitle = ").unwrap();
    assert!(matches!(
        load_manifest(&broken, &LibrarySettings::default()),
        Err(ManifestError::Parse { .. })
    ));
}

#[test]
fn track_id_round_trips_through_display() {
    let id = TrackId::new("0xabc:7");
    assert_eq!(id.to_string(), "0xabc:7");
    assert_eq!(id.as_str(), "0xabc:7");
    assert_eq!(id, TrackId::new(String::from("0xabc:7")));
}
