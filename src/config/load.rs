use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file and lets environment
/// variables (prefix `CADENCE__`) override it, falling back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CADENCE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject values the controller or driver cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        let volume = self.playback.volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(format!("playback.volume must be within 0..=1 (got {volume})"));
        }
        if self.controls.tick_ms == 0 {
            return Err("controls.tick_ms must be >= 1".to_string());
        }
        if !(self.controls.volume_step > 0.0 && self.controls.volume_step <= 1.0) {
            return Err("controls.volume_step must be within (0, 1]".to_string());
        }
        let window = self.preload.initial.max(self.preload.lookahead);
        if self.preload.capacity != 0 && self.preload.capacity < window {
            return Err(format!(
                "preload.capacity must be 0 or at least {window} to hold a full preload window"
            ));
        }
        Ok(())
    }
}

/// Resolve the config path from `CADENCE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CADENCE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cadence/config.toml`
/// or `~/.config/cadence/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("cadence").join("config.toml"))
}
