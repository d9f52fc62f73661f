use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadence/config.toml` or `~/.config/cadence/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENCE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub preload: PreloadSettings,
    pub controls: ControlsSettings,
    pub status: StatusSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Initial session volume in `[0, 1]`.
    pub volume: f32,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    pub repeat: RepeatModeSetting,
    /// Fade-out duration when quitting (milliseconds). 0 stops immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            shuffle: false,
            repeat: RepeatModeSetting::None,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "off", alias = "no-repeat", alias = "no_repeat", alias = "no-loop")]
    None,
    #[serde(alias = "repeat-one", alias = "repeat_one", alias = "loop-one", alias = "single")]
    One,
    #[serde(alias = "repeat-all", alias = "repeat_all", alias = "loop-all", alias = "loop-around")]
    All,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreloadSettings {
    /// Tracks prepared as soon as a queue is populated.
    pub initial: usize,
    /// Tracks after the playing one prepared once playback has settled.
    pub lookahead: usize,
    /// Delay before lookahead preloading starts (milliseconds), so it does
    /// not compete with the buffering of the track that just started.
    pub delay_ms: u64,
    /// Maximum number of preloaded handles. 0 disables preloading.
    pub capacity: usize,
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            initial: 3,
            lookahead: 3,
            delay_ms: 1000,
            capacity: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub seek_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
    /// Driver loop interval (milliseconds); also the current-time refresh rate.
    pub tick_ms: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            volume_step: 0.05,
            tick_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusSettings {
    /// Which time fields to show in the status line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub time_fields: Vec<TimeField>,
    /// Separator used to join `time_fields`.
    pub time_separator: String,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            time_fields: vec![TimeField::Elapsed, TimeField::Total],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    /// "artist - title".
    Display,
    Title,
    Artist,
    Album,
    Creator,
    Filename,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,

    /// Which fields build `Track.display`.
    ///
    /// Example: ["artist", "title"] -> "Artist - Title"
    pub display_fields: Vec<TrackDisplayField>,
    /// Separator used to join `display_fields`.
    pub display_separator: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            display_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            display_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Append logs to this file instead of stderr.
    pub file: Option<std::path::PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "cadence=info".to_string(),
            file: None,
        }
    }
}
