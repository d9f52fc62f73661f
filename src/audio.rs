//! Audio engine capability.
//!
//! The playback controller never talks to an output device directly. It
//! drives an [`AudioEngine`] through opaque [`HandleId`]s and learns about
//! asynchronous progress (load finished, playback ended, ...) through the
//! [`EngineEvent`] channel. [`RodioEngine`] is the production implementation.

mod engine;
mod error;
mod rodio_engine;
mod types;

pub use engine::AudioEngine;
pub use error::EngineError;
pub use rodio_engine::RodioEngine;
pub use types::*;

#[cfg(test)]
pub(crate) mod fake;
