//! Shared helpers for engine integration tests

#![allow(dead_code)]

use sonata_playback::{
    AudioBackend, BackendError, BackendEventSink, BackendResult, EngineConfig, LoadId,
    PlaybackEngine, PlaybackEvent, Track,
};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Backend method call, recorded in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Reset,
    SetSource(String),
    Prepare(LoadId),
    Start,
    Pause,
    SeekTo(u64),
    Stop,
    Release,
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    sink: Option<BackendEventSink>,
    loads: Vec<LoadId>,
    playing: bool,
    position: u64,
    fail_pause: bool,
    released: bool,
}

/// Backend driven by the test: prepare and completion only happen when the
/// test says so
pub struct ScriptedBackend {
    inner: Arc<Mutex<Inner>>,
}

/// Test-side handle to a [`ScriptedBackend`] owned by an engine
#[derive(Clone)]
pub struct Script {
    inner: Arc<Mutex<Inner>>,
}

pub fn scripted() -> (ScriptedBackend, Script) {
    let inner = Arc::new(Mutex::new(Inner::default()));
    (
        ScriptedBackend {
            inner: Arc::clone(&inner),
        },
        Script { inner },
    )
}

impl Script {
    fn sink(&self) -> BackendEventSink {
        self.inner
            .lock()
            .unwrap()
            .sink
            .clone()
            .expect("engine attached the backend")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn last_load(&self) -> LoadId {
        *self
            .inner
            .lock()
            .unwrap()
            .loads
            .last()
            .expect("a prepare was requested")
    }

    pub fn loads(&self) -> Vec<LoadId> {
        self.inner.lock().unwrap().loads.clone()
    }

    /// Report the most recent prepare as finished
    pub fn finish_prepare(&self) {
        self.sink().prepared(self.last_load());
    }

    pub fn send_prepared(&self, load: LoadId) {
        self.sink().prepared(load);
    }

    pub fn fail_prepare(&self, message: &str) {
        self.sink().failed(self.last_load(), message);
    }

    /// Report the natural end of the current track
    pub fn finish_track(&self) {
        let load = self.last_load();
        {
            let mut inner = self.inner.lock().unwrap();
            inner.playing = false;
        }
        self.sink().completed(load);
    }

    pub fn set_position(&self, position_ms: u64) {
        self.inner.lock().unwrap().position = position_ms;
    }

    pub fn fail_next_pause(&self) {
        self.inner.lock().unwrap().fail_pause = true;
    }

    pub fn released(&self) -> bool {
        self.inner.lock().unwrap().released
    }
}

impl AudioBackend for ScriptedBackend {
    fn attach(&mut self, sink: BackendEventSink) {
        self.inner.lock().unwrap().sink = Some(sink);
    }

    fn reset(&mut self) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Reset);
        inner.playing = false;
        inner.position = 0;
        Ok(())
    }

    fn set_source(&mut self, locator: &str) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::SetSource(locator.to_string()));
        if locator.is_empty() {
            return Err(BackendError::InvalidSource(locator.to_string()));
        }
        Ok(())
    }

    fn prepare_async(&mut self, load: LoadId) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Prepare(load));
        inner.loads.push(load);
        Ok(())
    }

    fn start(&mut self) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Start);
        inner.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Pause);
        if inner.fail_pause {
            inner.fail_pause = false;
            return Err(BackendError::Unavailable("device lost".to_string()));
        }
        inner.playing = false;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::SeekTo(position_ms));
        inner.position = position_ms;
        Ok(())
    }

    fn current_position(&self) -> u64 {
        self.inner.lock().unwrap().position
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().unwrap().playing
    }

    fn stop(&mut self) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Stop);
        inner.playing = false;
        inner.position = 0;
        Ok(())
    }

    fn release(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Release);
        inner.released = true;
        inner.sink = None;
    }
}

// ===== Fixtures =====

pub fn create_test_track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {}", id.to_uppercase()),
        artist_name: "Test Artist".to_string(),
        audio_locator: Some(format!("mem://{}", id)),
        artwork_locator: format!("https://img.example/{}.jpg", id),
        duration_secs: 180,
    }
}

pub fn playlist(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| create_test_track(id)).collect()
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        shuffle_seed: Some(42),
        ..Default::default()
    }
}

pub fn spawn_engine(config: EngineConfig) -> (PlaybackEngine, Script) {
    let (backend, script) = scripted();
    let engine = PlaybackEngine::spawn(backend, config).expect("valid config");
    (engine, script)
}

/// Start `id` from `ids` and let the backend finish preparing it
pub async fn start_playing(engine: &PlaybackEngine, script: &Script, id: &str, ids: &[&str]) {
    engine
        .play(create_test_track(id), playlist(ids), None)
        .unwrap();
    engine.flush().await.unwrap();
    script.finish_prepare();
    engine.flush().await.unwrap();
}

pub fn drain(events: &mut broadcast::Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

pub fn active_ids(engine: &PlaybackEngine) -> Vec<String> {
    engine
        .snapshot()
        .active_order
        .iter()
        .map(|t| t.id.clone())
        .collect()
}
