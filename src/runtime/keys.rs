use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MediaKeyCode};

use crate::config::ControlsSettings;
use crate::player::PlayerCmd;

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Player(PlayerCmd),
    Quit,
}

pub fn map_key(key: KeyEvent, controls: &ControlsSettings) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(KeyAction::Quit),
            _ => None,
        };
    }

    let seek = controls.seek_seconds.min(i64::MAX as u64) as i64;
    let cmd = match key.code {
        KeyCode::Media(media) => return map_media_key(media).map(KeyAction::Player),
        KeyCode::Char('q') | KeyCode::Esc => return Some(KeyAction::Quit),
        KeyCode::Char(' ') | KeyCode::Char('p') => PlayerCmd::TogglePlayPause,
        KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right => PlayerCmd::Next,
        KeyCode::Char('b') | KeyCode::Char('h') | KeyCode::Left => PlayerCmd::Previous,
        KeyCode::Char('L') => PlayerCmd::SeekBy(seek),
        KeyCode::Char('H') => PlayerCmd::SeekBy(-seek),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
            PlayerCmd::AdjustVolume(controls.volume_step)
        }
        KeyCode::Char('-') | KeyCode::Down => PlayerCmd::AdjustVolume(-controls.volume_step),
        KeyCode::Char('s') => PlayerCmd::ToggleShuffle,
        KeyCode::Char('r') => PlayerCmd::ToggleRepeat,
        KeyCode::Char('c') => PlayerCmd::ClearQueue,
        KeyCode::Char('m') => PlayerCmd::SetVolume(0.0),
        KeyCode::Char('0') => PlayerCmd::Seek(std::time::Duration::ZERO),
        KeyCode::Char(c @ '1'..='9') => PlayerCmd::Select(c as usize - '1' as usize),
        _ => return None,
    };
    Some(KeyAction::Player(cmd))
}

/// Media keys, when the terminal reports them.
fn map_media_key(media: MediaKeyCode) -> Option<PlayerCmd> {
    let cmd = match media {
        MediaKeyCode::Play => PlayerCmd::Resume,
        MediaKeyCode::Pause => PlayerCmd::Pause,
        MediaKeyCode::PlayPause => PlayerCmd::TogglePlayPause,
        MediaKeyCode::TrackNext => PlayerCmd::Next,
        MediaKeyCode::TrackPrevious => PlayerCmd::Previous,
        MediaKeyCode::MuteVolume => PlayerCmd::SetVolume(0.0),
        _ => return None,
    };
    Some(cmd)
}
