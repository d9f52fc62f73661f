use thiserror::Error;

use crate::library::TrackId;

/// Failures surfaced to the UI through [`PlaybackController::last_error`].
///
/// [`PlaybackController::last_error`]: super::PlaybackController::last_error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("could not load {track}: {reason}")]
    LoadFailed { track: TrackId, reason: String },
}
