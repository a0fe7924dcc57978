//! Playlist files
//!
//! A playlist is either a bare JSON array of tracks or an object carrying
//! an album context next to the tracks:
//!
//! ```json
//! { "album": { "id": "a1", "name": "Live", "artwork_locator": "" },
//!   "tracks": [ { "id": "t1", "name": "Intro", "artist_name": "X",
//!                 "audio_locator": "mem://t1", "duration_secs": 95 } ] }
//! ```

use anyhow::{bail, Context};
use serde::Deserialize;
use sonata_playback::{AlbumContext, SimulatedBackend, Track};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Playlist {
    pub album: Option<AlbumContext>,
    pub tracks: Vec<Track>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlaylistFile {
    Tracks(Vec<Track>),
    Album {
        #[serde(default)]
        album: Option<AlbumContext>,
        tracks: Vec<Track>,
    },
}

impl Playlist {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read playlist {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid playlist {}", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let playlist = match serde_json::from_str(contents)? {
            PlaylistFile::Album { album, tracks } => Self { album, tracks },
            PlaylistFile::Tracks(tracks) => Self {
                album: None,
                tracks,
            },
        };

        if playlist.tracks.is_empty() {
            bail!("Playlist has no tracks");
        }

        let mut seen = HashSet::new();
        for track in &playlist.tracks {
            if !seen.insert(track.id.as_str()) {
                bail!("Duplicate track id {:?}", track.id);
            }
        }

        Ok(playlist)
    }

    /// Track to start with: `id` when given, else the first one
    pub fn start_track(&self, id: Option<&str>) -> anyhow::Result<&Track> {
        match id {
            Some(id) => self
                .tracks
                .iter()
                .find(|t| t.id == id)
                .with_context(|| format!("No track with id {:?} in playlist", id)),
            None => self.tracks.first().context("Playlist has no tracks"),
        }
    }

    /// Simulated backend that knows every locator in the playlist
    ///
    /// Tracks without a duration play for one second.
    pub fn backend(&self, prepare_delay: Duration) -> SimulatedBackend {
        let mut backend = SimulatedBackend::new().with_prepare_delay(prepare_delay);
        for track in &self.tracks {
            if let Some(locator) = &track.audio_locator {
                let length = Duration::from_secs(u64::from(track.duration_secs.max(1)));
                backend.add_track(locator.clone(), length);
            }
        }
        backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACKS: &str = r#"[
        {"id": "a", "name": "One", "artist_name": "X", "audio_locator": "mem://a", "duration_secs": 120},
        {"id": "b", "name": "Two", "artist_name": "X", "audio_locator": "mem://b"}
    ]"#;

    #[test]
    fn parses_bare_track_array() {
        let playlist = Playlist::parse(TRACKS).unwrap();

        assert!(playlist.album.is_none());
        assert_eq!(playlist.tracks.len(), 2);
        assert_eq!(playlist.tracks[1].duration_secs, 0);
        assert_eq!(playlist.tracks[1].artwork_locator, "");
    }

    #[test]
    fn parses_album_object() {
        let json = format!(
            r#"{{"album": {{"id": "al", "name": "Album", "artwork_locator": "art.jpg"}}, "tracks": {}}}"#,
            TRACKS
        );

        let playlist = Playlist::parse(&json).unwrap();

        assert_eq!(playlist.album.map(|a| a.id), Some("al".to_string()));
        assert_eq!(playlist.tracks.len(), 2);
    }

    #[test]
    fn rejects_empty_and_duplicate_playlists() {
        assert!(Playlist::parse("[]").is_err());

        let duplicate = r#"[
            {"id": "a", "name": "One", "artist_name": "X"},
            {"id": "a", "name": "Again", "artist_name": "X"}
        ]"#;
        assert!(Playlist::parse(duplicate).is_err());
    }

    #[test]
    fn start_track_lookup() {
        let playlist = Playlist::parse(TRACKS).unwrap();

        assert_eq!(playlist.start_track(None).unwrap().id, "a");
        assert_eq!(playlist.start_track(Some("b")).unwrap().id, "b");
        assert!(playlist.start_track(Some("zzz")).is_err());
    }
}
