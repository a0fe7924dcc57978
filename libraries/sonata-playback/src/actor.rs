//! Engine task: owns the backend and all playback state
//!
//! Caller commands, backend callbacks and poll ticks share one queue, so
//! every state transition is applied by this task in arrival order.

use crate::backend::{AudioBackend, BackendEvent, BackendEventSink, LoadId};
use crate::config::EngineConfig;
use crate::events::PlaybackEvent;
use crate::order::PlayOrder;
use crate::poller::ProgressPoller;
use crate::state::PlaybackSnapshot;
use crate::types::{AlbumContext, PlaybackStatus, RepeatMode, Track};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Messages consumed by the engine task
pub(crate) enum EngineMessage {
    Command(Command),
    Backend(BackendEvent),
    Tick { generation: u64 },
}

pub(crate) enum Command {
    Play {
        track: Track,
        playlist: Vec<Track>,
        album: Option<AlbumContext>,
    },
    Pause,
    Resume,
    TogglePlayPause,
    Seek(u64),
    Next,
    Previous,
    ToggleRepeat,
    ToggleShuffle,
    Reset,
    Flush(oneshot::Sender<()>),
    Shutdown,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Play { .. } => "play",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::TogglePlayPause => "toggle_play_pause",
            Command::Seek(_) => "seek",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::ToggleRepeat => "toggle_repeat",
            Command::ToggleShuffle => "toggle_shuffle",
            Command::Reset => "reset",
            Command::Flush(_) => "flush",
            Command::Shutdown => "shutdown",
        }
    }
}

pub(crate) struct EngineActor<B: AudioBackend> {
    backend: B,
    config: EngineConfig,
    rng: StdRng,

    current_track: Option<Track>,
    status: PlaybackStatus,
    position_ms: u64,
    repeat_mode: RepeatMode,
    shuffle: bool,
    album: Option<AlbumContext>,
    order: PlayOrder,

    load_counter: u64,
    current_load: Option<LoadId>,
    prepare_deadline: Option<Instant>,
    poller: ProgressPoller,

    self_tx: mpsc::UnboundedSender<EngineMessage>,
    state_tx: watch::Sender<PlaybackSnapshot>,
    event_tx: broadcast::Sender<PlaybackEvent>,
}

impl<B: AudioBackend> EngineActor<B> {
    pub(crate) fn new(
        mut backend: B,
        config: EngineConfig,
        self_tx: mpsc::UnboundedSender<EngineMessage>,
        state_tx: watch::Sender<PlaybackSnapshot>,
        event_tx: broadcast::Sender<PlaybackEvent>,
    ) -> Self {
        backend.attach(BackendEventSink::new(self_tx.clone()));

        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            backend,
            rng,
            current_track: None,
            status: PlaybackStatus::Idle,
            position_ms: 0,
            repeat_mode: config.repeat_mode,
            shuffle: config.shuffle,
            album: None,
            order: PlayOrder::new(),
            load_counter: 0,
            current_load: None,
            prepare_deadline: None,
            poller: ProgressPoller::new(config.poll_interval()),
            config,
            self_tx,
            state_tx,
            event_tx,
        }
    }

    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<EngineMessage>) {
        debug!("Playback engine started");

        loop {
            let message = tokio::select! {
                biased;
                message = rx.recv() => message,
                () = wait_until(self.prepare_deadline) => {
                    self.on_prepare_timeout();
                    self.publish();
                    continue;
                }
            };

            match message {
                Some(EngineMessage::Command(Command::Shutdown)) | None => break,
                Some(EngineMessage::Command(Command::Flush(ack))) => {
                    // Receiver may have given up waiting
                    let _ = ack.send(());
                }
                Some(EngineMessage::Command(command)) => self.handle_command(command),
                Some(EngineMessage::Backend(event)) => self.handle_backend_event(event),
                Some(EngineMessage::Tick { generation }) => self.on_tick(generation),
            }

            self.publish();
        }

        self.release().await;
        debug!("Playback engine stopped");
    }

    fn handle_command(&mut self, command: Command) {
        debug!(command = command.name(), "Handling command");

        match command {
            Command::Play {
                track,
                playlist,
                album,
            } => self.play(track, playlist, album),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePlayPause => self.toggle_play_pause(),
            Command::Seek(position_ms) => self.seek(position_ms),
            Command::Next => self.play_next(),
            Command::Previous => self.play_previous(),
            Command::ToggleRepeat => self.toggle_repeat_mode(),
            Command::ToggleShuffle => self.toggle_shuffle_mode(),
            Command::Reset => self.reset_player(),
            Command::Flush(_) | Command::Shutdown => {}
        }
    }

    fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Prepared(load) => self.on_prepared(load),
            BackendEvent::Completed(load) => self.on_completed(load),
            BackendEvent::Failed { load, message } => self.on_failed(load, &message),
        }
    }

    // ===== Commands =====

    fn play(&mut self, track: Track, playlist: Vec<Track>, album: Option<AlbumContext>) {
        let already_playing = self.status == PlaybackStatus::Playing
            && self.current_track.as_ref().is_some_and(|t| t.id == track.id)
            && self.backend.is_playing();
        if already_playing {
            debug!(track_id = %track.id, "Track already playing, ignoring play");
            return;
        }

        self.order
            .load(playlist, self.shuffle, &track.id, &mut self.rng);
        if self.order.index().is_none() {
            warn!(track_id = %track.id, "Track is not part of the supplied playlist");
        }
        self.album = album;

        self.load_and_play(track);
    }

    fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            debug!(status = ?self.status, "Nothing playing, ignoring pause");
            return;
        }

        if let Err(e) = self.backend.pause() {
            warn!("Backend failed to pause: {}", e);
            return;
        }

        self.poller.cancel();
        self.position_ms = self.backend.current_position();
        self.status = PlaybackStatus::Paused;
    }

    fn resume(&mut self) {
        if self.status != PlaybackStatus::Paused {
            debug!(status = ?self.status, "Nothing paused, ignoring resume");
            return;
        }

        if let Err(e) = self.backend.start() {
            warn!("Backend failed to resume: {}", e);
            return;
        }

        self.status = PlaybackStatus::Playing;
        self.poller.start(self.self_tx.clone());
    }

    fn toggle_play_pause(&mut self) {
        match self.status {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused => self.resume(),
            PlaybackStatus::Idle | PlaybackStatus::Loading => {
                debug!(status = ?self.status, "Ignoring play/pause toggle");
            }
        }
    }

    fn seek(&mut self, position_ms: u64) {
        if self.current_track.is_none() {
            debug!(position_ms, "No track loaded, ignoring seek");
            return;
        }

        if let Err(e) = self.backend.seek_to(position_ms) {
            warn!(position_ms, "Backend failed to seek: {}", e);
        }
    }

    fn play_next(&mut self) {
        match self.order.advance() {
            Some(track) => self.load_and_play(track),
            None => debug!("Play order is empty, ignoring next"),
        }
    }

    fn play_previous(&mut self) {
        match self.order.retreat() {
            Some(track) => self.load_and_play(track),
            None => debug!("Play order is empty, ignoring previous"),
        }
    }

    fn toggle_repeat_mode(&mut self) {
        self.repeat_mode = self.repeat_mode.next();
        info!(mode = %self.repeat_mode, "Repeat mode changed");
    }

    fn toggle_shuffle_mode(&mut self) {
        self.shuffle = !self.shuffle;
        info!(enabled = self.shuffle, "Shuffle toggled");

        if let Some(track) = &self.current_track {
            self.order
                .set_shuffle(self.shuffle, &track.id, &mut self.rng);
        }
    }

    fn reset_player(&mut self) {
        info!("Resetting player");

        if let Err(e) = self.backend.stop() {
            debug!("Backend stop during reset: {}", e);
        }
        if let Err(e) = self.backend.reset() {
            warn!("Backend failed to reset: {}", e);
        }

        self.poller.cancel();
        self.current_load = None;
        self.prepare_deadline = None;
        self.current_track = None;
        self.status = PlaybackStatus::Idle;
        self.position_ms = 0;
        self.album = None;
        self.order.clear();
    }

    // ===== Loading =====

    fn load_and_play(&mut self, track: Track) {
        self.poller.cancel();

        self.load_counter += 1;
        let load = LoadId::new(self.load_counter);
        self.current_load = Some(load);
        self.prepare_deadline = None;

        info!(track_id = %track.id, %load, "Loading track");

        let locator = track.audio_locator.clone().unwrap_or_default();
        self.current_track = Some(track);
        self.position_ms = 0;
        self.status = PlaybackStatus::Loading;

        let prepared = self
            .backend
            .reset()
            .and_then(|()| self.backend.set_source(&locator))
            .and_then(|()| self.backend.prepare_async(load));

        match prepared {
            Ok(()) => {
                self.prepare_deadline = self
                    .config
                    .prepare_timeout()
                    .map(|timeout| Instant::now() + timeout);
            }
            Err(e) => self.abandon_track(&format!("Failed to prepare track: {e}")),
        }
    }

    fn on_prepared(&mut self, load: LoadId) {
        if !self.is_current_load(load) || self.status != PlaybackStatus::Loading {
            debug!(%load, "Ignoring stale prepared event");
            return;
        }

        self.prepare_deadline = None;

        if let Err(e) = self.backend.start() {
            self.abandon_track(&format!("Failed to start playback: {e}"));
            return;
        }

        if let Some(track) = &self.current_track {
            info!(track_id = %track.id, %load, "Playback started");
        }
        self.status = PlaybackStatus::Playing;
        self.poller.start(self.self_tx.clone());
    }

    fn on_failed(&mut self, load: LoadId, message: &str) {
        if !self.is_current_load(load) {
            debug!(%load, "Ignoring stale failure: {}", message);
            return;
        }

        self.abandon_track(message);
    }

    fn on_prepare_timeout(&mut self) {
        self.prepare_deadline = None;
        if self.status != PlaybackStatus::Loading {
            return;
        }

        let timeout_ms = self.config.prepare_timeout_ms;
        self.abandon_track(&format!("Prepare timed out after {timeout_ms}ms"));
    }

    /// Give up on the current track and return to idle
    fn abandon_track(&mut self, reason: &str) {
        let track_id = self.current_track.as_ref().map(|t| t.id.clone());
        warn!(track_id = ?track_id, "Abandoning track: {}", reason);

        self.poller.cancel();
        self.current_load = None;
        self.prepare_deadline = None;
        self.current_track = None;
        self.status = PlaybackStatus::Idle;
        self.position_ms = 0;

        self.emit(PlaybackEvent::Error {
            message: reason.to_string(),
        });
    }

    // ===== Completion & polling =====

    fn on_completed(&mut self, load: LoadId) {
        if !self.is_current_load(load) || self.status != PlaybackStatus::Playing {
            debug!(%load, "Ignoring stale completion");
            return;
        }

        if let Some(track) = &self.current_track {
            info!(track_id = %track.id, repeat = %self.repeat_mode, "Track finished");
            self.emit(PlaybackEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }

        match self.repeat_mode {
            RepeatMode::One => self.restart_current(),
            RepeatMode::All => self.play_next(),
            RepeatMode::Off if self.order.has_following() => self.play_next(),
            RepeatMode::Off => self.stop_at_end(),
        }
    }

    fn restart_current(&mut self) {
        let restarted = self
            .backend
            .seek_to(0)
            .and_then(|()| self.backend.start());
        if let Err(e) = restarted {
            self.abandon_track(&format!("Failed to restart track: {e}"));
            return;
        }

        self.position_ms = 0;
    }

    /// End of list without repeat: park at the start of the last track
    fn stop_at_end(&mut self) {
        info!("Reached end of play order");

        self.poller.cancel();
        self.status = PlaybackStatus::Paused;
        self.position_ms = 0;

        if let Err(e) = self.backend.seek_to(0) {
            warn!("Backend failed to rewind: {}", e);
        }
    }

    fn on_tick(&mut self, generation: u64) {
        if !self.poller.is_current(generation) || self.status != PlaybackStatus::Playing {
            return;
        }

        self.position_ms = self.backend.current_position();
    }

    fn is_current_load(&self, load: LoadId) -> bool {
        self.current_load == Some(load)
    }

    // ===== Publishing =====

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.current_track.clone(),
            status: self.status,
            position_ms: self.position_ms,
            repeat_mode: self.repeat_mode,
            shuffle: self.shuffle,
            album: self.album.clone(),
            original_order: self.order.original().clone(),
            active_order: self.order.active().clone(),
            active_index: self.order.index(),
        }
    }

    fn publish(&self) {
        let next = self.snapshot();
        let previous = self.state_tx.borrow().clone();
        if next == previous {
            return;
        }

        let events = next.changes_since(&previous);
        self.state_tx.send_replace(next);
        for event in events {
            self.emit(event);
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    async fn release(&mut self) {
        self.poller.shutdown().await;

        if self.status.has_track() {
            if let Err(e) = self.backend.stop() {
                debug!("Backend stop during shutdown: {}", e);
            }
        }
        self.backend.release();
        info!("Audio backend released");
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
