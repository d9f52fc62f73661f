use std::time::Duration;

use super::error::EngineError;
use super::types::HandleId;

/// The operations the playback controller needs from an audio backend.
///
/// Loading is asynchronous: `create` only starts preparing the locator and
/// returns a handle immediately. Completion (or failure) is reported later
/// through the engine's event channel. Operations on unknown or already
/// unloaded handles are ignored.
pub trait AudioEngine {
    /// Start preparing `locator` at the given initial volume. The new handle
    /// stays paused until `play` is called.
    fn create(&mut self, locator: &str, volume: f32) -> Result<HandleId, EngineError>;

    fn play(&mut self, handle: HandleId);

    fn pause(&mut self, handle: HandleId);

    /// Halt playback and rewind to the start.
    fn stop(&mut self, handle: HandleId);

    /// Seek and return the position playback actually landed on.
    fn seek(&mut self, handle: HandleId, position: Duration) -> Option<Duration>;

    fn set_volume(&mut self, handle: HandleId, volume: f32);

    /// Authoritative duration, known once the handle has loaded.
    fn duration(&self, handle: HandleId) -> Option<Duration>;

    /// Current playback position.
    fn position(&self, handle: HandleId) -> Option<Duration>;

    /// Release everything held for `handle`.
    fn unload(&mut self, handle: HandleId);
}
