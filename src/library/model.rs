use std::fmt;
use std::time::Duration;

/// Stable identity of a track for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A playable queue entry.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Where the audio lives. A track may be listed without playable audio.
    pub locator: Option<String>,
    /// Estimated duration. The engine's value wins once the track is loaded.
    pub duration: Option<Duration>,
    pub creator: Option<String>,
    /// External content id (e.g. a token or content hash), display only.
    pub content_id: Option<String>,
    pub likes: u64,
    pub display: String,
}
