//! Transport enums, commands and the read-only snapshot handed to the UI.

use std::time::Duration;

use crate::library::TrackId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No handle bound.
    #[default]
    Idle,
    /// The engine is preparing the selected track.
    Loading,
    Playing,
    Paused,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    #[default]
    None,
    /// Repeat the current track.
    One,
    /// Wrap around to the start of the queue.
    All,
}

impl RepeatMode {
    /// none -> one -> all -> none
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::One,
            Self::One => Self::All,
            Self::All => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::One => "one",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCmd {
    /// Select and play the track at the given queue index.
    Select(usize),
    TogglePlayPause,
    Pause,
    Resume,
    Next,
    Previous,
    /// Seek to an absolute position.
    Seek(Duration),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Set an absolute volume; `0.0` mutes.
    SetVolume(f32),
    /// Change the volume by a signed delta.
    AdjustVolume(f32),
    ToggleShuffle,
    ToggleRepeat,
    ClearQueue,
}

/// Playback information exposed to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackInfo {
    pub index: Option<usize>,
    pub track: Option<TrackId>,
    pub state: PlayerState,
    pub elapsed: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub queue_len: usize,
    pub error: Option<String>,
}

impl PlaybackInfo {
    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.state == PlayerState::Loading
    }
}
