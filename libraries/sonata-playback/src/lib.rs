//! Sonata - Playback Engine
//!
//! Platform-agnostic playback control for the Sonata player.
//!
//! This crate provides:
//! - Play / pause / resume / seek of a single track
//! - Playlist navigation (next / previous, wrap-around)
//! - Repeat modes (Off, All, One)
//! - Shuffle with restorable original order
//! - Position polling while playing
//! - Observable state ([`PlaybackSnapshot`]) and events ([`PlaybackEvent`])
//!
//! # Architecture
//!
//! The engine runs as one tokio task that owns all mutable state and the
//! [`AudioBackend`]. Callers hold a cheap, cloneable [`PlaybackEngine`]
//! handle. Caller commands, backend callbacks and progress ticks are
//! queued on a single channel and applied strictly in order:
//!
//! ```text
//!  PlaybackEngine ─┐
//!  BackendEventSink ├──> engine task ──> watch<PlaybackSnapshot>
//!  ProgressPoller ──┘        │       └─> broadcast<PlaybackEvent>
//!                            v
//!                       AudioBackend
//! ```
//!
//! The audio decoder/renderer is supplied by the platform through the
//! [`AudioBackend`] trait. [`SimulatedBackend`] is a clock-driven stand-in
//! with no audio output.
//!
//! # Example
//!
//! ```rust,no_run
//! use sonata_playback::{EngineConfig, PlaybackEngine, SimulatedBackend, Track};
//! use std::time::Duration;
//!
//! # async fn run() -> sonata_playback::Result<()> {
//! let backend = SimulatedBackend::new()
//!     .with_track("mem://intro", Duration::from_secs(90));
//! let engine = PlaybackEngine::spawn(backend, EngineConfig::default())?;
//!
//! let track = Track {
//!     id: "intro".to_string(),
//!     name: "Intro".to_string(),
//!     artist_name: "Sonata".to_string(),
//!     audio_locator: Some("mem://intro".to_string()),
//!     artwork_locator: String::new(),
//!     duration_secs: 90,
//! };
//!
//! let mut events = engine.subscribe();
//! engine.play(track.clone(), vec![track], None)?;
//! engine.flush().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.name());
//! }
//!
//! engine.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod actor;
mod backend;
mod config;
mod engine;
mod error;
mod events;
mod order;
mod poller;
mod shuffle;
mod simulated;
mod state;
pub mod types;

// Public exports
pub use backend::{AudioBackend, BackendEvent, BackendEventSink, LoadId};
pub use config::EngineConfig;
pub use engine::PlaybackEngine;
pub use error::{BackendError, BackendResult, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use order::PlayOrder;
pub use shuffle::shuffled;
pub use simulated::SimulatedBackend;
pub use state::PlaybackSnapshot;
pub use types::{AlbumContext, PlaybackStatus, RepeatMode, Track};
