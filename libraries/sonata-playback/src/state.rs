//! Published engine state

use crate::events::PlaybackEvent;
use crate::types::{AlbumContext, PlaybackStatus, RepeatMode, Track};
use std::sync::Arc;

/// Read-only view of the engine, republished on every change
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    /// Track loaded into the backend
    pub current_track: Option<Track>,

    pub status: PlaybackStatus,

    /// Last polled offset, 0 after every track change
    pub position_ms: u64,

    pub repeat_mode: RepeatMode,

    pub shuffle: bool,

    pub album: Option<AlbumContext>,

    /// Playlist as supplied to `play`
    pub original_order: Arc<[Track]>,

    /// Order used by next/previous
    pub active_order: Arc<[Track]>,

    /// Position of the loaded track in `active_order`
    pub active_index: Option<usize>,
}

impl PlaybackSnapshot {
    pub(crate) fn initial(repeat_mode: RepeatMode, shuffle: bool) -> Self {
        Self {
            current_track: None,
            status: PlaybackStatus::Idle,
            position_ms: 0,
            repeat_mode,
            shuffle,
            album: None,
            original_order: Arc::from(Vec::new()),
            active_order: Arc::from(Vec::new()),
            active_index: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|t| t.id.as_str())
    }

    /// Events describing the transition from `previous` to `self`
    pub(crate) fn changes_since(&self, previous: &Self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();

        if self.current_track_id() != previous.current_track_id() {
            events.push(PlaybackEvent::TrackChanged {
                track_id: self.current_track_id().map(str::to_string),
                previous_track_id: previous.current_track_id().map(str::to_string),
            });
        }

        if self.status != previous.status {
            events.push(PlaybackEvent::StateChanged {
                status: self.status,
            });
        }

        if self.position_ms != previous.position_ms {
            events.push(PlaybackEvent::PositionUpdate {
                position_ms: self.position_ms,
                duration_ms: self.current_track.as_ref().map_or(0, Track::duration_ms),
            });
        }

        if self.repeat_mode != previous.repeat_mode {
            events.push(PlaybackEvent::RepeatModeChanged {
                mode: self.repeat_mode,
            });
        }

        if self.shuffle != previous.shuffle {
            events.push(PlaybackEvent::ShuffleChanged {
                enabled: self.shuffle,
            });
        }

        if self.album != previous.album {
            events.push(PlaybackEvent::AlbumChanged {
                album_id: self.album.as_ref().map(|a| a.id.clone()),
            });
        }

        if !Arc::ptr_eq(&self.active_order, &previous.active_order)
            && self.active_order != previous.active_order
        {
            events.push(PlaybackEvent::QueueChanged {
                length: self.active_order.len(),
            });
        }

        events
    }
}
