//! Handle ids and the notification channel shared by every engine.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use super::error::EngineError;

/// Opaque reference to one prepared audio asset inside an engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous notifications emitted by an engine.
#[derive(Debug)]
pub enum EngineEvent {
    /// The handle finished loading and can be played.
    Ready {
        handle: HandleId,
        /// Duration reported by the decoder, if it knows one.
        duration: Option<Duration>,
    },
    /// The handle could not be prepared.
    Error { handle: HandleId, error: EngineError },
    PlaybackStarted { handle: HandleId },
    PlaybackPaused { handle: HandleId },
    PlaybackStopped { handle: HandleId },
    /// A seek completed; `position` is where playback actually landed.
    Seeked { handle: HandleId, position: Duration },
    /// The handle played through to the end of its source.
    Ended { handle: HandleId },
}

pub type EventSender = Sender<EngineEvent>;
pub type EventReceiver = Receiver<EngineEvent>;

/// Create the channel an engine reports through and the controller drains.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel()
}
