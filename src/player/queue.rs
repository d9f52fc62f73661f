//! Helpers to reorder the playback queue.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::library::{Track, TrackId};

/// Shuffle `queue` in place (Fisher–Yates). When `current` points at a
/// track, that track is moved to the front first and only the rest is
/// permuted, so the playing track ends up at index 0.
pub(super) fn shuffle_with_current_first<R: Rng + ?Sized>(
    queue: &mut [Track],
    current: Option<usize>,
    rng: &mut R,
) {
    match current.filter(|&i| i < queue.len()) {
        Some(i) => {
            queue.swap(0, i);
            queue[1..].shuffle(rng);
        }
        None => queue.shuffle(rng),
    }
}

pub(super) fn position_of(queue: &[Track], id: &TrackId) -> Option<usize> {
    queue.iter().position(|t| &t.id == id)
}
