//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Playable track descriptor
///
/// Owned by the catalog; the engine keeps copies and never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Identifier, unique within a playlist
    pub id: String,

    /// Display name
    pub name: String,

    /// Artist display name
    pub artist_name: String,

    /// Media locator handed to the audio backend
    #[serde(default)]
    pub audio_locator: Option<String>,

    /// Artwork reference for display
    #[serde(default)]
    pub artwork_locator: String,

    /// Track length in whole seconds
    #[serde(default)]
    pub duration_secs: u32,
}

impl Track {
    /// Track length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_secs) * 1000
    }
}

/// Provenance of the active playlist, carried for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumContext {
    pub id: String,
    pub name: String,
    pub artwork_locator: String,
}

/// Lifecycle status derived from the loaded track and the playing flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No track loaded
    #[default]
    Idle,

    /// Backend is preparing the current track
    Loading,

    /// Currently playing
    Playing,

    /// Track loaded but not rendering
    Paused,
}

impl PlaybackStatus {
    /// Whether a track is loaded (preparing, playing or paused)
    pub fn has_track(self) -> bool {
        !matches!(self, PlaybackStatus::Idle)
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the list ends
    #[default]
    Off,

    /// Loop the entire list
    All,

    /// Loop the current track
    One,
}

impl RepeatMode {
    /// Next mode in the toggle cycle: Off -> All -> One -> Off
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        };
        f.write_str(name)
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(RepeatMode::Off),
            "all" => Ok(RepeatMode::All),
            "one" => Ok(RepeatMode::One),
            other => Err(format!("unknown repeat mode: {other}")),
        }
    }
}
