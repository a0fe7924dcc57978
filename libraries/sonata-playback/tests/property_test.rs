//! Property-based tests for play order and repeat policy
//!
//! Uses proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sonata_playback::{shuffled, PlayOrder, RepeatMode, Track};
use std::collections::HashSet;

// ===== Helpers =====

fn track(id: String, duration_secs: u32) -> Track {
    Track {
        name: format!("Track {}", id),
        artist_name: "Artist".to_string(),
        audio_locator: Some(format!("mem://{}", id)),
        artwork_locator: String::new(),
        duration_secs,
        id,
    }
}

/// Playlists with unique ids
fn arbitrary_playlist() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::hash_set("[a-z0-9]{1,8}", 1..40).prop_flat_map(|ids| {
        let ids: Vec<String> = ids.into_iter().collect();
        let len = ids.len();
        prop::collection::vec(1u32..600, len).prop_map(move |durations| {
            ids.iter()
                .cloned()
                .zip(durations)
                .map(|(id, secs)| track(id, secs))
                .collect()
        })
    })
}

fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

// ===== Property Tests =====

proptest! {
    /// Property: shuffle on then off restores the original order
    #[test]
    fn shuffle_round_trip_restores_original(
        playlist in arbitrary_playlist(),
        pick in any::<prop::sample::Index>(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let current = playlist[pick.index(playlist.len())].id.clone();
        let mut order = PlayOrder::new();
        order.load(playlist.clone(), false, &current, &mut rng);

        order.set_shuffle(true, &current, &mut rng);
        order.set_shuffle(false, &current, &mut rng);

        prop_assert_eq!(ids(order.active()), ids(&playlist));
        prop_assert_eq!(order.active(), order.original());
        prop_assert_eq!(order.current().map(|t| t.id.clone()), Some(current));
    }

    /// Property: shuffling is a permutation that keeps the cursor on the current track
    #[test]
    fn shuffle_is_permutation_keeping_cursor(
        playlist in arbitrary_playlist(),
        pick in any::<prop::sample::Index>(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let current = playlist[pick.index(playlist.len())].id.clone();
        let mut order = PlayOrder::new();
        order.load(playlist.clone(), true, &current, &mut rng);

        let active: HashSet<&str> = ids(order.active()).into_iter().collect();
        let original: HashSet<&str> = ids(&playlist).into_iter().collect();
        prop_assert_eq!(active, original);
        prop_assert_eq!(order.len(), playlist.len());
        prop_assert_eq!(order.current().map(|t| t.id.clone()), Some(current));
        prop_assert_eq!(ids(order.original()), ids(&playlist));
    }

    /// Property: advancing len times visits every track once and returns to the start
    #[test]
    fn advance_cycles_through_every_track(
        playlist in arbitrary_playlist(),
        start in any::<prop::sample::Index>(),
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let len = playlist.len();
        let first = start.index(len);
        let mut order = PlayOrder::new();
        order.load(playlist.clone(), false, &playlist[first].id, &mut rng);

        let mut visited = HashSet::new();
        for _ in 0..len {
            let track = order.advance().expect("non-empty order");
            visited.insert(track.id);
        }

        prop_assert_eq!(visited.len(), len);
        prop_assert_eq!(order.index(), Some(first));
    }

    /// Property: retreat undoes advance, including across the wrap point
    #[test]
    fn retreat_inverts_advance(
        playlist in arbitrary_playlist(),
        start in any::<prop::sample::Index>(),
        steps in 1usize..100,
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let first = start.index(playlist.len());
        let mut order = PlayOrder::new();
        order.load(playlist.clone(), false, &playlist[first].id, &mut rng);

        for _ in 0..steps {
            order.advance();
        }
        for _ in 0..steps {
            order.retreat();
        }

        prop_assert_eq!(order.index(), Some(first));
    }

    /// Property: the index is always within bounds after navigation
    #[test]
    fn index_stays_in_bounds(
        playlist in arbitrary_playlist(),
        moves in prop::collection::vec(any::<bool>(), 0..200),
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let mut order = PlayOrder::new();
        order.load(playlist.clone(), false, "not-in-playlist", &mut rng);

        for forward in moves {
            if forward {
                order.advance();
            } else {
                order.retreat();
            }
            if let Some(index) = order.index() {
                prop_assert!(index < playlist.len());
            }
        }
    }

    /// Property: only the last index has no following track
    #[test]
    fn has_following_false_only_at_last_index(
        playlist in arbitrary_playlist(),
        start in any::<prop::sample::Index>(),
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let len = playlist.len();
        let first = start.index(len);
        let mut order = PlayOrder::new();
        order.load(playlist.clone(), false, &playlist[first].id, &mut rng);

        prop_assert_eq!(order.has_following(), first + 1 < len);
    }

    /// Property: shuffled output preserves every track
    #[test]
    fn shuffled_preserves_tracks(playlist in arbitrary_playlist(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = shuffled(&playlist, &mut rng);

        let mut expected = ids(&playlist);
        let mut actual = ids(&result);
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    /// Property: three repeat toggles return to the starting mode
    #[test]
    fn repeat_cycle_has_period_three(start in prop_oneof![
        Just(RepeatMode::Off),
        Just(RepeatMode::All),
        Just(RepeatMode::One),
    ]) {
        prop_assert_eq!(start.next().next().next(), start);
        prop_assert_ne!(start.next(), start);
    }
}
