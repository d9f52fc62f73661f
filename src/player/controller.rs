use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::audio::{AudioEngine, EngineError, EngineEvent, EventReceiver, HandleId};
use crate::config::PreloadSettings;
use crate::library::{Track, TrackId};

use super::error::PlayerError;
use super::preload::PreloadCache;
use super::queue::{position_of, shuffle_with_current_first};
use super::types::{PlaybackInfo, PlayerCmd, PlayerState, RepeatMode};

/// Volume used for preloaded handles until they become the current track.
const MUTED: f32 = 0.0;

/// Queue and transport state machine on top of an [`AudioEngine`].
///
/// At most one handle is ever audible: the one bound to the current track.
/// Every other handle the controller creates lives muted in the preload
/// cache and is unloaded exactly once, when it is evicted, fails, or the
/// queue is replaced or cleared.
pub struct PlaybackController<E: AudioEngine> {
    engine: E,
    events: EventReceiver,
    preload_settings: PreloadSettings,

    queue: Vec<Track>,
    /// Queue order from before shuffle was switched on.
    unshuffled: Option<Vec<Track>>,
    current: Option<usize>,
    state: PlayerState,
    /// Handle of the current track once it is playable.
    bound: Option<HandleId>,
    /// Handle the engine is still preparing for the current track.
    loading: Option<HandleId>,
    /// Latest selection requested while a load was outstanding.
    pending: Option<TrackId>,

    current_time: Duration,
    duration: Option<Duration>,
    volume: f32,
    shuffle: bool,
    repeat: RepeatMode,

    preload: PreloadCache,
    /// When lookahead preloading is due, and the queue index it counts from.
    preload_due: Option<(Instant, usize)>,
    last_error: Option<PlayerError>,
}

impl<E: AudioEngine> PlaybackController<E> {
    pub fn new(engine: E, events: EventReceiver, preload: PreloadSettings) -> Self {
        Self {
            engine,
            events,
            preload: PreloadCache::new(preload.capacity),
            preload_settings: preload,
            queue: Vec::new(),
            unshuffled: None,
            current: None,
            state: PlayerState::Idle,
            bound: None,
            loading: None,
            pending: None,
            current_time: Duration::ZERO,
            duration: None,
            volume: 1.0,
            shuffle: false,
            repeat: RepeatMode::None,
            preload_due: None,
            last_error: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.queue.get(i))
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.state == PlayerState::Loading
    }

    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    /// Engine-reported duration of the current track, or its estimate
    /// until the engine has loaded it.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn last_error(&self) -> Option<&PlayerError> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        PlaybackInfo {
            index: self.current,
            track: self.current_id(),
            state: self.state,
            elapsed: self.current_time,
            duration: self.duration,
            volume: self.volume,
            shuffle: self.shuffle,
            repeat: self.repeat,
            queue_len: self.queue.len(),
            error: self.last_error.as_ref().map(|e| e.to_string()),
        }
    }

    /// Dispatch a command to the matching operation.
    pub fn apply(&mut self, cmd: PlayerCmd) {
        trace!(?cmd, "command");
        match cmd {
            PlayerCmd::Select(i) => self.select_index(i),
            PlayerCmd::TogglePlayPause => self.toggle_play_pause(),
            PlayerCmd::Pause => self.pause(),
            PlayerCmd::Resume => self.resume(),
            PlayerCmd::Next => self.next(),
            PlayerCmd::Previous => self.previous(),
            PlayerCmd::Seek(t) => self.seek(t),
            PlayerCmd::SeekBy(secs) => self.seek_by(secs),
            PlayerCmd::SetVolume(v) => self.set_volume(v),
            PlayerCmd::AdjustVolume(delta) => self.adjust_volume(delta),
            PlayerCmd::ToggleShuffle => self.toggle_shuffle(),
            PlayerCmd::ToggleRepeat => self.toggle_repeat(),
            PlayerCmd::ClearQueue => self.clear_queue(),
        }
    }

    /// Apply every engine notification received so far. Returns how many
    /// were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Ready { handle, duration } => self.on_ready(handle, duration),
            EngineEvent::Error { handle, error } => self.on_error(handle, error),
            EngineEvent::Ended { handle } => {
                if self.bound == Some(handle) {
                    self.on_ended();
                } else {
                    trace!(%handle, "ended notification for inactive handle");
                }
            }
            EngineEvent::Seeked { handle, position } => {
                if self.bound == Some(handle) {
                    self.current_time = self.clamp_time(position);
                }
            }
            other => trace!(?other, "engine notification"),
        }
    }

    /// Periodic refresh, driven at a short fixed interval by the runtime.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if self.state == PlayerState::Playing {
            if let Some(pos) = self.bound.and_then(|h| self.engine.position(h)) {
                self.current_time = self.clamp_time(pos);
            }
        }

        if let Some((due, anchor)) = self.preload_due {
            if now >= due {
                self.preload_due = None;
                self.preload_window(anchor + 1, self.preload_settings.lookahead);
            }
        }
    }

    pub fn select_track(&mut self, id: &TrackId) {
        match position_of(&self.queue, id) {
            Some(i) => self.select_index(i),
            None => debug!(track = %id, "selected track is not in the queue"),
        }
    }

    pub fn select_index(&mut self, index: usize) {
        let Some(track) = self.queue.get(index) else {
            debug!(index, len = self.queue.len(), "selection out of range");
            return;
        };
        let id = track.id.clone();
        let locator = track.locator.clone();
        let estimate = track.duration;

        if self.loading.is_some() {
            if self.current == Some(index) {
                // Back to the track already loading: drop any queued switch.
                self.pending = None;
            } else {
                debug!(track = %id, "load in flight, deferring selection");
                self.pending = Some(id);
            }
            return;
        }

        self.release_current();
        self.current = Some(index);
        self.current_time = Duration::ZERO;
        self.duration = estimate;
        self.preload_due = None;
        self.last_error = None;

        if let Some(entry) = self.preload.take(&id) {
            if entry.ready {
                debug!(track = %id, handle = %entry.handle, "using preloaded handle");
                self.bind(entry.handle);
            } else {
                debug!(track = %id, handle = %entry.handle, "adopting preload still in flight");
                self.loading = Some(entry.handle);
                self.state = PlayerState::Loading;
            }
            return;
        }

        let Some(locator) = locator else {
            self.fail_load(id, EngineError::MissingLocator.to_string());
            return;
        };
        match self.engine.create(&locator, self.volume) {
            Ok(handle) => {
                info!(track = %id, %handle, "loading");
                self.loading = Some(handle);
                self.state = PlayerState::Loading;
            }
            Err(e) => self.fail_load(id, e.to_string()),
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        let Some(handle) = self.bound else {
            return;
        };
        self.engine.pause(handle);
        if let Some(pos) = self.engine.position(handle) {
            self.current_time = self.clamp_time(pos);
        }
        self.state = PlayerState::Paused;
    }

    pub fn resume(&mut self) {
        if self.state != PlayerState::Paused {
            return;
        }
        let Some(handle) = self.bound else {
            return;
        };
        self.engine.play(handle);
        self.state = PlayerState::Playing;
    }

    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlayerState::Playing => self.pause(),
            PlayerState::Paused => self.resume(),
            PlayerState::Idle | PlayerState::Loading => trace!("nothing to toggle"),
        }
    }

    /// Seek within the current track. The reported time follows even when
    /// nothing is bound yet. Without a known duration the target is not
    /// bounded above.
    pub fn seek(&mut self, position: Duration) {
        let target = self.clamp_time(position);
        self.current_time = target;
        if let Some(handle) = self.bound {
            if let Some(landed) = self.engine.seek(handle, target) {
                self.current_time = self.clamp_time(landed);
            }
        }
    }

    pub fn seek_by(&mut self, secs: i64) {
        let delta = Duration::from_secs(secs.unsigned_abs());
        let target = if secs < 0 {
            self.current_time.saturating_sub(delta)
        } else {
            self.current_time.saturating_add(delta)
        };
        self.seek(target);
    }

    /// Clamp to `[0, 1]` and store as the session volume.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.volume = volume;
        if let Some(handle) = self.bound {
            self.engine.set_volume(handle, volume);
        }
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    pub fn next(&mut self) {
        if self.repeat == RepeatMode::One && self.current.is_some() {
            self.restart_current();
            return;
        }
        let len = self.queue.len();
        if len == 0 {
            return;
        }
        match self.current {
            None => self.select_index(0),
            Some(i) if i + 1 < len => self.select_index(i + 1),
            Some(_) if self.repeat == RepeatMode::All => self.select_index(0),
            Some(_) => self.stop_at_end(),
        }
    }

    pub fn previous(&mut self) {
        if self.repeat == RepeatMode::One && self.current.is_some() {
            self.restart_current();
            return;
        }
        let len = self.queue.len();
        if len == 0 {
            return;
        }
        match self.current {
            Some(i) if i > 0 => self.select_index(i - 1),
            _ if self.repeat == RepeatMode::All => self.select_index(len - 1),
            _ => {}
        }
    }

    /// Swap in a new queue. Nothing plays until a track is selected; the
    /// first few entries start preloading right away.
    pub fn replace_queue(&mut self, tracks: Vec<Track>) {
        self.release_current();
        self.release_preloads();
        self.pending = None;
        self.preload_due = None;

        self.queue = tracks;
        self.unshuffled = None;
        if self.shuffle && self.queue.len() > 1 {
            self.unshuffled = Some(self.queue.clone());
            shuffle_with_current_first(&mut self.queue, None, &mut rand::rng());
        }
        self.current = None;
        self.current_time = Duration::ZERO;
        self.duration = None;
        self.last_error = None;

        info!(count = self.queue.len(), "queue replaced");
        self.preload_window(0, self.preload_settings.initial);
    }

    pub fn clear_queue(&mut self) {
        self.release_current();
        self.release_preloads();
        self.pending = None;
        self.preload_due = None;

        self.queue.clear();
        self.unshuffled = None;
        self.current = None;
        self.current_time = Duration::ZERO;
        self.duration = None;
        self.last_error = None;
        info!("queue cleared");
    }

    /// Switching on permutes the queue and moves the selection to index 0.
    /// Switching off restores the order from before shuffling.
    pub fn toggle_shuffle(&mut self) {
        if self.shuffle {
            self.shuffle = false;
            if let Some(original) = self.unshuffled.take() {
                let current = self.current_id();
                self.queue = original;
                self.current = current.and_then(|id| position_of(&self.queue, &id));
            }
        } else {
            self.shuffle = true;
            if self.queue.len() > 1 {
                self.unshuffled = Some(self.queue.clone());
                shuffle_with_current_first(&mut self.queue, self.current, &mut rand::rng());
                self.current = Some(0);
            }
        }

        // Lookahead counts from a queue position, which just moved.
        if let (Some((due, _)), Some(i)) = (self.preload_due, self.current) {
            self.preload_due = Some((due, i));
        }
        info!(shuffle = self.shuffle, "shuffle toggled");
    }

    pub fn toggle_repeat(&mut self) {
        self.set_repeat_mode(self.repeat.cycle());
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
        info!(repeat = mode.label(), "repeat mode");
    }

    fn current_id(&self) -> Option<TrackId> {
        self.current_track().map(|t| t.id.clone())
    }

    fn clamp_time(&self, t: Duration) -> Duration {
        match self.duration {
            Some(d) => t.min(d),
            None => t,
        }
    }

    fn bind(&mut self, handle: HandleId) {
        self.loading = None;
        self.bound = Some(handle);
        if let Some(d) = self.engine.duration(handle) {
            self.duration = Some(d);
        }
        self.engine.set_volume(handle, self.volume);
        self.engine.play(handle);
        self.state = PlayerState::Playing;
        self.current_time = Duration::ZERO;
        self.schedule_lookahead();

        if let Some(track) = self.current_track() {
            info!(track = %track.id, title = %track.title, "playing");
        }
    }

    fn fail_load(&mut self, track: TrackId, reason: String) {
        warn!(%track, "load failed: {reason}");
        if let Some(handle) = self.loading.take() {
            self.engine.unload(handle);
        }
        self.state = PlayerState::Idle;
        self.current_time = Duration::ZERO;
        self.last_error = Some(PlayerError::LoadFailed { track, reason });
    }

    /// Stop and release whatever is bound or loading for the current track.
    fn release_current(&mut self) {
        if let Some(handle) = self.bound.take() {
            self.engine.stop(handle);
            self.engine.unload(handle);
        }
        if let Some(handle) = self.loading.take() {
            self.engine.unload(handle);
        }
        self.state = PlayerState::Idle;
    }

    fn release_preloads(&mut self) {
        for handle in self.preload.drain() {
            self.engine.unload(handle);
        }
    }

    fn cache_preload(&mut self, track: TrackId, handle: HandleId, ready: bool) {
        for evicted in self.preload.insert(track, handle, ready) {
            debug!(handle = %evicted, "evicting preload");
            self.engine.unload(evicted);
        }
    }

    fn on_ready(&mut self, handle: HandleId, duration: Option<Duration>) {
        if self.loading == Some(handle) {
            if duration.is_some() {
                self.duration = duration;
            }
            if let Some(next) = self.pending.take() {
                // Superseded while loading: keep the work for later instead of playing it.
                self.loading = None;
                self.state = PlayerState::Idle;
                match self.current_id() {
                    Some(id) => {
                        self.engine.set_volume(handle, MUTED);
                        self.cache_preload(id, handle, true);
                    }
                    None => self.engine.unload(handle),
                }
                self.select_track(&next);
                return;
            }
            self.bind(handle);
            return;
        }

        if self.preload.mark_ready(handle) {
            debug!(%handle, cached = self.preload.len(), "preload ready");
        } else {
            trace!(%handle, "ready notification for released handle");
        }
    }

    fn on_error(&mut self, handle: HandleId, error: EngineError) {
        if self.loading == Some(handle) {
            match self.current_id() {
                Some(track) => self.fail_load(track, error.to_string()),
                None => {
                    self.loading = None;
                    self.engine.unload(handle);
                    self.state = PlayerState::Idle;
                }
            }
            if let Some(next) = self.pending.take() {
                let failure = self.last_error.take();
                self.select_track(&next);
                // Keep the failure visible unless the next track failed too.
                if self.last_error.is_none() {
                    self.last_error = failure;
                }
            }
            return;
        }

        if let Some(entry) = self.preload.remove_handle(handle) {
            debug!(track = %entry.track, "preload failed: {error}");
            self.engine.unload(handle);
            return;
        }

        if self.bound == Some(handle) {
            warn!(%handle, "playback failed: {error}");
            let track = self.current_id();
            self.release_current();
            self.current_time = Duration::ZERO;
            if let Some(track) = track {
                self.last_error = Some(PlayerError::LoadFailed {
                    track,
                    reason: error.to_string(),
                });
            }
            return;
        }

        trace!(%handle, "error notification for released handle: {error}");
    }

    fn on_ended(&mut self) {
        debug!("track ended");
        match self.repeat {
            RepeatMode::One => self.restart_current(),
            RepeatMode::None | RepeatMode::All => self.next(),
        }
    }

    fn restart_current(&mut self) {
        match (self.bound, self.current) {
            (Some(handle), _) => {
                self.engine.seek(handle, Duration::ZERO);
                self.current_time = Duration::ZERO;
                self.engine.play(handle);
                self.state = PlayerState::Playing;
            }
            (None, Some(i)) if self.loading.is_none() => self.select_index(i),
            _ => {}
        }
    }

    fn stop_at_end(&mut self) {
        info!("end of queue");
        self.release_current();
        self.pending = None;
        self.preload_due = None;
        self.current_time = Duration::ZERO;
    }

    fn schedule_lookahead(&mut self) {
        if !self.preload.is_enabled() || self.preload_settings.lookahead == 0 {
            return;
        }
        if let Some(i) = self.current {
            let due = Instant::now() + Duration::from_millis(self.preload_settings.delay_ms);
            self.preload_due = Some((due, i));
        }
    }

    /// Start preparing up to `count` tracks from `start`, skipping the
    /// current track, tracks already cached and tracks without audio.
    fn preload_window(&mut self, start: usize, count: usize) {
        if !self.preload.is_enabled() || count == 0 {
            return;
        }
        let current = self.current_id();
        let wanted: Vec<(TrackId, String)> = self
            .queue
            .iter()
            .skip(start)
            .take(count)
            .filter(|t| current.as_ref() != Some(&t.id))
            .filter(|t| !self.preload.contains(&t.id))
            .filter_map(|t| t.locator.clone().map(|l| (t.id.clone(), l)))
            .collect();

        for (id, locator) in wanted {
            match self.engine.create(&locator, MUTED) {
                Ok(handle) => {
                    debug!(track = %id, %handle, "preloading");
                    self.cache_preload(id, handle, false);
                }
                Err(e) => debug!(track = %id, "skipping preload: {e}"),
            }
        }
    }
}

impl<E: AudioEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.release_current();
        self.release_preloads();
    }
}
