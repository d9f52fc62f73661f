use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_cadence_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CADENCE_CONFIG_PATH", "/tmp/cadence-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/cadence-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("cadence")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("cadence")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 0.5
shuffle = true
repeat = "repeat-one"
quit_fade_out_ms = 0

[preload]
initial = 2
lookahead = 4
delay_ms = 250
capacity = 6

[controls]
seek_seconds = 9
volume_step = 0.1
tick_ms = 50

[status]
time_fields = ["elapsed", "remaining"]
time_separator = " | "

[library]
extensions = ["mp3"]
recursive = false
display_fields = ["creator", "title"]
display_separator = "::"

[logging]
filter = "cadence=debug"
file = "/tmp/cadence.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENCE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CADENCE__PRELOAD__DELAY_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.volume, 0.5);
    assert!(s.playback.shuffle);
    assert!(matches!(s.playback.repeat, RepeatModeSetting::One));
    assert_eq!(s.playback.quit_fade_out_ms, 0);
    assert_eq!(s.preload.initial, 2);
    assert_eq!(s.preload.lookahead, 4);
    assert_eq!(s.preload.delay_ms, 250);
    assert_eq!(s.preload.capacity, 6);
    assert_eq!(s.controls.seek_seconds, 9);
    assert_eq!(s.controls.tick_ms, 50);
    assert_eq!(s.status.time_fields.len(), 2);
    assert!(matches!(s.status.time_fields[1], TimeField::Remaining));
    assert_eq!(s.status.time_separator, " | ");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(matches!(s.library.display_fields[0], TrackDisplayField::Creator));
    assert_eq!(s.logging.filter, "cadence=debug");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/cadence.log"))
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[preload]
delay_ms = 1000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENCE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CADENCE__PRELOAD__DELAY_MS", "0");

    let s = Settings::load().unwrap();
    assert_eq!(s.preload.delay_ms, 0);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let ok = Settings::default();
    assert!(ok.validate().is_ok());

    let mut loud = Settings::default();
    loud.playback.volume = 1.5;
    assert!(loud.validate().unwrap_err().contains("playback.volume"));

    let mut frozen = Settings::default();
    frozen.controls.tick_ms = 0;
    assert!(frozen.validate().is_err());

    let mut cramped = Settings::default();
    cramped.preload.capacity = 2;
    assert!(cramped.validate().unwrap_err().contains("preload.capacity"));

    let mut disabled = Settings::default();
    disabled.preload.capacity = 0;
    assert!(disabled.validate().is_ok());
}
