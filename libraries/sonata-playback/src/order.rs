//! Play order: original playlist, active (possibly shuffled) order and cursor
//!
//! ```text
//! original: A B C D      (as supplied, restore point)
//! active:   C A D B      (== original unless shuffled)
//!               ^ index  (position of the loaded track in `active`)
//! ```

use crate::shuffle::shuffled;
use crate::types::Track;
use rand::Rng;
use std::sync::Arc;

/// Navigation order for next/previous
///
/// Both sequences are shared immutable slices so snapshots can carry
/// them without copying the tracks.
#[derive(Debug, Clone)]
pub struct PlayOrder {
    /// Playlist as supplied by the caller, untouched by shuffle
    original: Arc<[Track]>,

    /// Order actually used for navigation
    active: Arc<[Track]>,

    /// Position of the loaded track in `active`
    index: Option<usize>,
}

impl PlayOrder {
    /// Create an empty order
    pub fn new() -> Self {
        Self {
            original: Arc::from(Vec::new()),
            active: Arc::from(Vec::new()),
            index: None,
        }
    }

    /// Replace the playlist and point the cursor at `current_id`
    ///
    /// The cursor is `None` when the id is not part of the playlist.
    pub fn load<R: Rng + ?Sized>(
        &mut self,
        playlist: Vec<Track>,
        shuffle: bool,
        current_id: &str,
        rng: &mut R,
    ) {
        self.original = Arc::from(playlist);
        self.rebuild(shuffle, current_id, rng);
    }

    /// Rebuild the active order for a new shuffle flag
    ///
    /// Shuffling draws a fresh permutation of the original playlist;
    /// unshuffling restores it. The cursor follows `current_id`.
    pub fn set_shuffle<R: Rng + ?Sized>(&mut self, shuffle: bool, current_id: &str, rng: &mut R) {
        self.rebuild(shuffle, current_id, rng);
    }

    fn rebuild<R: Rng + ?Sized>(&mut self, shuffle: bool, current_id: &str, rng: &mut R) {
        self.active = if shuffle {
            Arc::from(shuffled(&self.original, rng))
        } else {
            Arc::clone(&self.original)
        };
        self.index = self.position_of(current_id);
    }

    /// Move the cursor forward, wrapping to the start
    ///
    /// A missing cursor starts at the first track. Returns the track under
    /// the new cursor, or `None` for an empty order.
    pub fn advance(&mut self) -> Option<Track> {
        let len = self.active.len();
        if len == 0 {
            return None;
        }

        let next = match self.index {
            Some(index) => (index + 1) % len,
            None => 0,
        };
        self.index = Some(next);
        Some(self.active[next].clone())
    }

    /// Move the cursor backward, wrapping to the end
    ///
    /// A missing cursor starts at the last track.
    pub fn retreat(&mut self) -> Option<Track> {
        let len = self.active.len();
        if len == 0 {
            return None;
        }

        let previous = match self.index {
            Some(index) if index > 0 => index - 1,
            _ => len - 1,
        };
        self.index = Some(previous);
        Some(self.active[previous].clone())
    }

    /// Whether advancing would not wrap around
    pub fn has_following(&self) -> bool {
        match self.index {
            Some(index) => index + 1 < self.active.len(),
            None => !self.active.is_empty(),
        }
    }

    /// Drop both sequences and the cursor
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn original(&self) -> &Arc<[Track]> {
        &self.original
    }

    pub fn active(&self) -> &Arc<[Track]> {
        &self.active
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.index.and_then(|index| self.active.get(index))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.active.iter().position(|t| t.id == id)
    }
}

impl Default for PlayOrder {
    fn default() -> Self {
        Self::new()
    }
}
