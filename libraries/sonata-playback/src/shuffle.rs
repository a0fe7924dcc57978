//! Shuffle algorithm for play order randomization

use crate::types::Track;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffled copy of a playlist
///
/// Pure random shuffle using Fisher-Yates: every track has equal
/// probability of appearing at any position. The input is left untouched
/// so it can serve as the restore point.
pub fn shuffled<R: Rng + ?Sized>(tracks: &[Track], rng: &mut R) -> Vec<Track> {
    let mut order = tracks.to_vec();
    order.shuffle(rng);
    order
}
