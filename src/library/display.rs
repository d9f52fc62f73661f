use std::path::Path;

use crate::config::TrackDisplayField;

/// Borrowed metadata a display string can be composed from.
pub(crate) struct DisplayParts<'a> {
    pub title: &'a str,
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
    pub creator: Option<&'a str>,
    /// Local file the track was read from, when there is one.
    pub source: Option<&'a Path>,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Build a display string for a track according to the provided `fields` and separator.
///
/// Falls back to `title` when none of the requested fields produced text.
pub(crate) fn display_from_fields(
    parts: &DisplayParts<'_>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let mut out: Vec<String> = Vec::new();
    let title = parts.title.trim();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                // "display" on its own means "artist - title".
                if let Some(a) = non_blank(parts.artist) {
                    out.push(a.to_string());
                }
                if !title.is_empty() {
                    out.push(title.to_string());
                }
            }
            TrackDisplayField::Title => {
                if !title.is_empty() {
                    out.push(title.to_string());
                }
            }
            TrackDisplayField::Artist => {
                if let Some(a) = non_blank(parts.artist) {
                    out.push(a.to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = non_blank(parts.album) {
                    out.push(a.to_string());
                }
            }
            TrackDisplayField::Creator => {
                if let Some(c) = non_blank(parts.creator) {
                    out.push(c.to_string());
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = parts
                    .source
                    .and_then(|p| p.file_stem())
                    .and_then(|s| s.to_str())
                {
                    if !stem.trim().is_empty() {
                        out.push(stem.to_string());
                    }
                }
            }
        }
    }

    if out.is_empty() {
        parts.title.to_string()
    } else {
        out.join(sep)
    }
}
