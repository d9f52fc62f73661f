//! `rodio`-backed engine.
//!
//! Every handle is a paused `Sink` attached to the shared output mixer.
//! Opening and decoding happen on a short-lived loader thread so `create`
//! never blocks the caller; a monitor thread watches playing sinks and
//! reports when one has drained.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, trace, warn};

use super::engine::AudioEngine;
use super::error::EngineError;
use super::types::{EngineEvent, EventSender, HandleId};

const MONITOR_INTERVAL: Duration = Duration::from_millis(100);
const FADE_STEPS: u32 = 20;

struct Slot {
    sink: Arc<Sink>,
    path: PathBuf,
    loaded: bool,
    playing: bool,
    ended: bool,
    duration: Option<Duration>,
}

type Slots = Arc<Mutex<HashMap<HandleId, Slot>>>;

pub struct RodioEngine {
    stream: OutputStream,
    slots: Slots,
    events: EventSender,
    next_id: u64,
    running: Arc<AtomicBool>,
    monitor: Option<JoinHandle<()>>,
}

impl RodioEngine {
    /// Open the default output device and start the end-of-track monitor.
    pub fn new(events: EventSender) -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which garbles the terminal.
        stream.log_on_drop(false);

        let slots: Slots = Arc::new(Mutex::new(HashMap::new()));
        let running = Arc::new(AtomicBool::new(true));
        let monitor = spawn_monitor(slots.clone(), events.clone(), running.clone());

        Ok(Self {
            stream,
            slots,
            events,
            next_id: 1,
            running,
            monitor: Some(monitor),
        })
    }

    /// Fade every audible sink to silence over `fade`. Blocks the caller.
    pub fn fade_out(&self, fade: Duration) {
        if fade.is_zero() {
            return;
        }
        let sinks: Vec<Arc<Sink>> = match self.slots.lock() {
            Ok(slots) => slots
                .values()
                .filter(|s| s.playing)
                .map(|s| s.sink.clone())
                .collect(),
            Err(_) => return,
        };
        if sinks.is_empty() {
            return;
        }

        let step = (fade / FADE_STEPS).max(Duration::from_millis(1));
        let start: Vec<f32> = sinks.iter().map(|s| s.volume()).collect();
        for i in 1..=FADE_STEPS {
            let t = i as f32 / FADE_STEPS as f32;
            for (sink, v) in sinks.iter().zip(&start) {
                sink.set_volume(v * (1.0 - t));
            }
            thread::sleep(step);
        }
    }

    fn with_slot<R>(&self, handle: HandleId, f: impl FnOnce(&mut Slot) -> R) -> Option<R> {
        let mut slots = self.slots.lock().ok()?;
        slots.get_mut(&handle).map(f)
    }

    fn emit(&self, event: EngineEvent) {
        // The controller may already be gone during shutdown.
        let _ = self.events.send(event);
    }
}

impl AudioEngine for RodioEngine {
    fn create(&mut self, locator: &str, volume: f32) -> Result<HandleId, EngineError> {
        let path = resolve_locator(locator)?;

        let sink = Arc::new(Sink::connect_new(self.stream.mixer()));
        sink.pause();
        sink.set_volume(volume);

        let handle = HandleId(self.next_id);
        self.next_id += 1;

        {
            let mut slots = self
                .slots
                .lock()
                .map_err(|_| EngineError::Output("engine state poisoned".to_string()))?;
            slots.insert(
                handle,
                Slot {
                    sink: sink.clone(),
                    path: path.clone(),
                    loaded: false,
                    playing: false,
                    ended: false,
                    duration: None,
                },
            );
        }

        debug!(%handle, path = %path.display(), "preparing audio");
        spawn_loader(handle, path, sink, self.slots.clone(), self.events.clone());
        Ok(handle)
    }

    fn play(&mut self, handle: HandleId) {
        let found = self
            .with_slot(handle, |slot| {
                slot.sink.play();
                slot.playing = true;
                slot.ended = false;
            })
            .is_some();
        if found {
            self.emit(EngineEvent::PlaybackStarted { handle });
        }
    }

    fn pause(&mut self, handle: HandleId) {
        let found = self
            .with_slot(handle, |slot| {
                slot.sink.pause();
                slot.playing = false;
            })
            .is_some();
        if found {
            self.emit(EngineEvent::PlaybackPaused { handle });
        }
    }

    fn stop(&mut self, handle: HandleId) {
        let found = self
            .with_slot(handle, |slot| {
                slot.sink.pause();
                let _ = slot.sink.try_seek(Duration::ZERO);
                slot.playing = false;
            })
            .is_some();
        if found {
            self.emit(EngineEvent::PlaybackStopped { handle });
        }
    }

    fn seek(&mut self, handle: HandleId, position: Duration) -> Option<Duration> {
        let landed = {
            let mut slots = self.slots.lock().ok()?;
            let slot = slots.get_mut(&handle)?;
            if !slot.loaded {
                return None;
            }
            if slot.sink.empty() {
                // A drained sink has nothing left to seek in; decode the file again.
                match decode(&slot.path) {
                    Ok(source) => slot.sink.append(source),
                    Err(e) => {
                        warn!(%handle, "cannot rewind drained track: {e}");
                        return None;
                    }
                }
            }
            if let Err(e) = slot.sink.try_seek(position) {
                debug!(%handle, "seek failed: {e}");
            }
            slot.ended = false;
            slot.sink.get_pos()
        };

        self.emit(EngineEvent::Seeked {
            handle,
            position: landed,
        });
        Some(landed)
    }

    fn set_volume(&mut self, handle: HandleId, volume: f32) {
        self.with_slot(handle, |slot| slot.sink.set_volume(volume));
    }

    fn duration(&self, handle: HandleId) -> Option<Duration> {
        let slots = self.slots.lock().ok()?;
        slots.get(&handle).and_then(|s| s.duration)
    }

    fn position(&self, handle: HandleId) -> Option<Duration> {
        let slots = self.slots.lock().ok()?;
        slots.get(&handle).map(|s| s.sink.get_pos())
    }

    fn unload(&mut self, handle: HandleId) {
        let removed = match self.slots.lock() {
            Ok(mut slots) => slots.remove(&handle),
            Err(_) => None,
        };
        if let Some(slot) = removed {
            slot.sink.stop();
            trace!(%handle, "unloaded");
        }
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Ok(mut slots) = self.slots.lock() {
            for (_, slot) in slots.drain() {
                slot.sink.stop();
            }
        }
        if let Some(h) = self.monitor.take() {
            let _ = h.join();
        }
    }
}

/// Map a track locator onto a local path.
///
/// Plain paths and `file://` URLs are accepted. Remote schemes are left to
/// a fetching layer in front of the engine.
pub(super) fn resolve_locator(locator: &str) -> Result<PathBuf, EngineError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(EngineError::MissingLocator);
    }
    if let Some(rest) = locator.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if locator.contains("://") {
        return Err(EngineError::UnsupportedLocator(locator.to_string()));
    }
    Ok(PathBuf::from(locator))
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn spawn_loader(
    handle: HandleId,
    path: PathBuf,
    sink: Arc<Sink>,
    slots: Slots,
    events: EventSender,
) {
    thread::spawn(move || {
        let still_wanted = |slots: &Slots| {
            slots
                .lock()
                .map(|s| s.contains_key(&handle))
                .unwrap_or(false)
        };

        match decode(&path) {
            Ok(source) => {
                let duration = source.total_duration();
                sink.append(source);

                let marked = match slots.lock() {
                    Ok(mut slots) => match slots.get_mut(&handle) {
                        Some(slot) => {
                            slot.loaded = true;
                            slot.duration = duration;
                            true
                        }
                        None => false,
                    },
                    Err(_) => false,
                };
                if marked {
                    let _ = events.send(EngineEvent::Ready { handle, duration });
                } else {
                    trace!(%handle, "load finished after unload");
                }
            }
            Err(error) => {
                if still_wanted(&slots) {
                    let _ = events.send(EngineEvent::Error { handle, error });
                }
            }
        }
    });
}

fn spawn_monitor(slots: Slots, events: EventSender, running: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::Relaxed) {
            thread::sleep(MONITOR_INTERVAL);

            let ended: Vec<HandleId> = match slots.lock() {
                Ok(mut slots) => slots
                    .iter_mut()
                    .filter(|(_, s)| s.loaded && s.playing && !s.ended && s.sink.empty())
                    .map(|(id, s)| {
                        s.ended = true;
                        s.playing = false;
                        *id
                    })
                    .collect(),
                Err(_) => break,
            };

            for handle in ended {
                if events.send(EngineEvent::Ended { handle }).is_err() {
                    return;
                }
            }
        }
    })
}
