//! In-memory engine used by controller tests. Records every call and never
//! emits events on its own; tests feed notifications in explicitly.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::engine::AudioEngine;
use super::error::EngineError;
use super::types::HandleId;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create(HandleId, String, f32),
    Play(HandleId),
    Pause(HandleId),
    Stop(HandleId),
    Seek(HandleId, Duration),
    SetVolume(HandleId, f32),
    Unload(HandleId),
}

#[derive(Default)]
pub(crate) struct FakeEngine {
    next_id: u64,
    pub calls: Vec<Call>,
    /// Durations reported once a handle is "loaded".
    pub durations: HashMap<HandleId, Duration>,
    pub positions: HashMap<HandleId, Duration>,
    /// Locators whose `create` fails synchronously.
    pub reject: HashSet<String>,
    live: HashSet<HandleId>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent handle created for `locator`.
    pub fn handle_for(&self, locator: &str) -> Option<HandleId> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Create(h, l, _) if l == locator => Some(*h),
            _ => None,
        })
    }

    pub fn create_count(&self, locator: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Create(_, l, _) if l == locator))
            .count()
    }

    pub fn unload_count(&self, handle: HandleId) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == Call::Unload(handle))
            .count()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn is_live(&self, handle: HandleId) -> bool {
        self.live.contains(&handle)
    }

    pub fn created_volume(&self, handle: HandleId) -> Option<f32> {
        self.calls.iter().find_map(|c| match c {
            Call::Create(h, _, v) if *h == handle => Some(*v),
            _ => None,
        })
    }
}

impl AudioEngine for FakeEngine {
    fn create(&mut self, locator: &str, volume: f32) -> Result<HandleId, EngineError> {
        if self.reject.contains(locator) {
            return Err(EngineError::UnsupportedLocator(locator.to_string()));
        }
        self.next_id += 1;
        let handle = HandleId(self.next_id);
        self.live.insert(handle);
        self.calls
            .push(Call::Create(handle, locator.to_string(), volume));
        Ok(handle)
    }

    fn play(&mut self, handle: HandleId) {
        self.calls.push(Call::Play(handle));
    }

    fn pause(&mut self, handle: HandleId) {
        self.calls.push(Call::Pause(handle));
    }

    fn stop(&mut self, handle: HandleId) {
        self.calls.push(Call::Stop(handle));
    }

    fn seek(&mut self, handle: HandleId, position: Duration) -> Option<Duration> {
        self.calls.push(Call::Seek(handle, position));
        self.positions.insert(handle, position);
        Some(position)
    }

    fn set_volume(&mut self, handle: HandleId, volume: f32) {
        self.calls.push(Call::SetVolume(handle, volume));
    }

    fn duration(&self, handle: HandleId) -> Option<Duration> {
        self.durations.get(&handle).copied()
    }

    fn position(&self, handle: HandleId) -> Option<Duration> {
        self.positions.get(&handle).copied()
    }

    fn unload(&mut self, handle: HandleId) {
        self.live.remove(&handle);
        self.calls.push(Call::Unload(handle));
    }
}
