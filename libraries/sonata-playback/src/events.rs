//! Playback Events
//!
//! Event-based communication for UI synchronization during playback.
//! Events are emitted at key points:
//! - State changes (loading/play/pause/idle)
//! - Track changes (new load, abandoned load, reset)
//! - Position updates (every poll tick while playing)
//! - Repeat, shuffle, album and order changes
//! - Natural track end and recoverable errors

use crate::types::{PlaybackStatus, RepeatMode};
use serde::{Deserialize, Serialize};

/// Events broadcast by the playback engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Playback status changed
    StateChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// Loaded track changed
    TrackChanged {
        /// ID of the new (current) track, `None` when unloaded
        track_id: Option<String>,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// Position update (every poll tick that moved the position)
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration
        duration_ms: u64,
    },

    /// Repeat mode changed
    RepeatModeChanged { mode: RepeatMode },

    /// Shuffle toggled
    ShuffleChanged { enabled: bool },

    /// Album context replaced or cleared
    AlbumChanged { album_id: Option<String> },

    /// Active order replaced, reshuffled or cleared
    QueueChanged {
        /// New active order length
        length: usize,
    },

    /// Track reached its natural end
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Recoverable failure (the engine keeps running)
    Error {
        /// Error message
        message: String,
    },
}

impl PlaybackEvent {
    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackEvent::StateChanged { .. } => "state_changed",
            PlaybackEvent::TrackChanged { .. } => "track_changed",
            PlaybackEvent::PositionUpdate { .. } => "position_update",
            PlaybackEvent::RepeatModeChanged { .. } => "repeat_mode_changed",
            PlaybackEvent::ShuffleChanged { .. } => "shuffle_changed",
            PlaybackEvent::AlbumChanged { .. } => "album_changed",
            PlaybackEvent::QueueChanged { .. } => "queue_changed",
            PlaybackEvent::TrackFinished { .. } => "track_finished",
            PlaybackEvent::Error { .. } => "error",
        }
    }
}
