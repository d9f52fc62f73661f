//! Playback controller.
//!
//! Owns the queue, the transport state and a small cache of preloaded
//! (muted) engine handles. All entry points are expected to be called from
//! a single thread; engine notifications are applied through
//! [`PlaybackController::pump_events`].

mod controller;
mod error;
mod preload;
mod queue;
mod types;

pub use controller::PlaybackController;
pub use error::PlayerError;
pub use types::*;
