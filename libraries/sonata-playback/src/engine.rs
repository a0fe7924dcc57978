//! Public handle to the playback engine

use crate::actor::{Command, EngineActor, EngineMessage};
use crate::backend::AudioBackend;
use crate::config::EngineConfig;
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::state::PlaybackSnapshot;
use crate::types::{AlbumContext, Track};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Handle to a running playback engine
///
/// All clones drive the same engine. Commands are queued and applied in
/// order by the engine task; they return as soon as the command is queued.
/// Use [`flush`](Self::flush) to wait until everything sent so far has been
/// applied, and [`watch`](Self::watch) or [`subscribe`](Self::subscribe)
/// to observe the results.
///
/// The engine stops when [`shutdown`](Self::shutdown) is called or when the
/// last handle is dropped.
#[derive(Clone)]
pub struct PlaybackEngine {
    shared: Arc<EngineShared>,
}

struct EngineShared {
    tx: mpsc::UnboundedSender<EngineMessage>,
    state_rx: watch::Receiver<PlaybackSnapshot>,
    event_tx: broadcast::Sender<PlaybackEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for EngineShared {
    fn drop(&mut self) {
        // The engine keeps senders of its own alive, so closing the
        // channel is not enough to stop it
        let _ = self.tx.send(EngineMessage::Command(Command::Shutdown));
    }
}

impl PlaybackEngine {
    /// Start an engine driving `backend`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<B: AudioBackend>(backend: B, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(PlaybackSnapshot::initial(
            config.repeat_mode,
            config.shuffle,
        ));
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        info!(
            poll_interval_ms = config.poll_interval_ms,
            prepare_timeout_ms = config.prepare_timeout_ms,
            "Starting playback engine"
        );

        let actor = EngineActor::new(backend, config, tx.clone(), state_tx, event_tx.clone());
        let task = tokio::spawn(actor.run(rx));

        Ok(Self {
            shared: Arc::new(EngineShared {
                tx,
                state_rx,
                event_tx,
                task: Mutex::new(Some(task)),
            }),
        })
    }

    fn send(&self, command: Command) -> Result<()> {
        self.shared
            .tx
            .send(EngineMessage::Command(command))
            .map_err(|_| PlaybackError::EngineClosed)
    }

    /// Play `track` with `playlist` as the navigation context
    ///
    /// Ignored when `track` is already playing. `album` replaces the album
    /// context (`None` clears it).
    pub fn play(
        &self,
        track: Track,
        playlist: Vec<Track>,
        album: Option<AlbumContext>,
    ) -> Result<()> {
        self.send(Command::Play {
            track,
            playlist,
            album,
        })
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(Command::Resume)
    }

    pub fn toggle_play_pause(&self) -> Result<()> {
        self.send(Command::TogglePlayPause)
    }

    /// Seek within the loaded track
    pub fn seek(&self, position_ms: u64) -> Result<()> {
        self.send(Command::Seek(position_ms))
    }

    /// Load the next track in the active order, wrapping around
    pub fn play_next(&self) -> Result<()> {
        self.send(Command::Next)
    }

    /// Load the previous track in the active order, wrapping around
    pub fn play_previous(&self) -> Result<()> {
        self.send(Command::Previous)
    }

    /// Cycle repeat mode Off -> All -> One -> Off
    pub fn toggle_repeat_mode(&self) -> Result<()> {
        self.send(Command::ToggleRepeat)
    }

    pub fn toggle_shuffle_mode(&self) -> Result<()> {
        self.send(Command::ToggleShuffle)
    }

    /// Stop playback and clear track, album and play order
    ///
    /// Repeat mode and shuffle flag are kept.
    pub fn reset_player(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    /// Wait until every message queued before this call has been applied
    pub async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::Flush(ack_tx))?;
        ack_rx.await.map_err(|_| PlaybackError::EngineClosed)
    }

    /// Latest published state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.state_rx.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn watch(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.shared.state_rx.clone()
    }

    /// Receive discrete playback events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Stop the engine, release the backend and wait for the task to exit
    ///
    /// Other handles get [`PlaybackError::EngineClosed`] afterwards. Calling
    /// it more than once is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        let Some(task) = self.shared.task.lock().await.take() else {
            return Ok(());
        };

        // Already closed if the task exited on its own
        let _ = self.send(Command::Shutdown);

        if let Err(e) = task.await {
            warn!("Playback engine task ended abnormally: {}", e);
        }
        Ok(())
    }

    /// Whether the engine task is still accepting commands
    pub fn is_running(&self) -> bool {
        !self.shared.tx.is_closed()
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.shared.state_rx.borrow();
        f.debug_struct("PlaybackEngine")
            .field("status", &snapshot.status)
            .field("current_track", &snapshot.current_track_id())
            .field("running", &self.is_running())
            .finish()
    }
}
