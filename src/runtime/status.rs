use std::time::Duration;

use crate::config::{StatusSettings, TimeField};
use crate::library::Track;
use crate::player::{PlaybackInfo, PlayerState};

fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn time_text(elapsed: Duration, total: Option<Duration>, status: &StatusSettings) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for f in &status.time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    parts.push(format!("-{}", format_mmss(t.saturating_sub(elapsed))));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&status.time_separator))
    }
}

fn state_marker(info: &PlaybackInfo) -> &'static str {
    if info.is_loading() {
        "[load]"
    } else if info.is_playing() {
        "[play]"
    } else if info.state == PlayerState::Paused {
        "[wait]"
    } else {
        "[stop]"
    }
}

/// One-line summary of the session, redrawn whenever it changes.
pub fn status_line(info: &PlaybackInfo, track: Option<&Track>, status: &StatusSettings) -> String {
    let mut parts: Vec<String> = vec![state_marker(info).to_string()];

    match (info.index, track) {
        (Some(i), Some(track)) => {
            parts.push(format!("{}/{}", i + 1, info.queue_len));
            parts.push(track.display.clone());
            if track.likes > 0 {
                parts.push(format!("<3 {}", track.likes));
            }
            if let Some(time) = time_text(info.elapsed, info.duration, status) {
                parts.push(time);
            }
        }
        _ => parts.push(format!("{} queued", info.queue_len)),
    }

    parts.push(format!("vol {:.0}%", info.volume * 100.0));
    if info.shuffle {
        parts.push("shuffle".to_string());
    }
    parts.push(format!("repeat {}", info.repeat.label()));
    if let Some(err) = &info.error {
        parts.push(format!("! {err}"));
    }
    parts.join("  ")
}
