use std::io::Write;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use crate::audio::AudioEngine;
use crate::config;
use crate::player::{PlaybackController, PlayerCmd};
use crate::runtime::keys::{KeyAction, map_key};
use crate::runtime::status::status_line;

/// Drive the controller until quit is requested: apply key presses, drain
/// engine notifications, refresh time and redraw the status line on change.
pub fn run<E: AudioEngine, W: Write>(
    out: &mut W,
    settings: &config::Settings,
    controller: &mut PlaybackController<E>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.controls.tick_ms);
    // Poll faster while a load is outstanding so `Ready` is applied promptly.
    let loading_tick = tick.min(Duration::from_millis(20));
    let mut last_line = String::new();
    let mut last_index = None;

    loop {
        controller.pump_events();
        controller.tick();

        if controller.current_index() != last_index {
            last_index = controller.current_index();
            if let Some(i) = last_index {
                debug!(index = i, queued = controller.queue().len(), "selection moved");
            }
        }

        let line = status_line(
            &controller.snapshot(),
            controller.current_track(),
            &settings.status,
        );
        if line != last_line {
            queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            write!(out, "{line}")?;
            out.flush()?;
            last_line = line;
        }

        let wait = if controller.is_loading() { loading_tick } else { tick };
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match map_key(key, &settings.controls) {
                    Some(KeyAction::Quit) => break,
                    Some(KeyAction::Player(PlayerCmd::Select(i)))
                        if i >= controller.queue().len() =>
                    {
                        debug!(index = i, "no queue entry for key");
                    }
                    Some(KeyAction::Player(cmd)) => controller.apply(cmd),
                    None => debug!(code = ?key.code, "unbound key"),
                }
            }
        }
    }

    Ok(())
}
