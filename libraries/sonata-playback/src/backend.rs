//! Audio backend contract
//!
//! Abstracts the platform decoder/renderer (a media player service, a
//! desktop output stream, a simulated player in tests). The engine drives
//! it through plain method calls; asynchronous outcomes come back through
//! the [`BackendEventSink`] handed over in [`AudioBackend::attach`].

use crate::actor::EngineMessage;
use crate::error::BackendResult;
use std::fmt;
use tokio::sync::mpsc;

/// Identifies one prepare cycle
///
/// Every load hands a fresh id to [`AudioBackend::prepare_async`]; events
/// carrying an older id are stale and dropped by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(u64);

impl LoadId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Asynchronous notifications raised by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Source is ready, `start` may be called
    Prepared(LoadId),

    /// Natural end of track (fires once per track end)
    Completed(LoadId),

    /// Preparing or rendering failed
    Failed { load: LoadId, message: String },
}

/// Channel back into the engine for backend callbacks
///
/// Cheap to clone and safe to use from any thread or callback context.
/// Sends after the engine has shut down are dropped.
#[derive(Clone)]
pub struct BackendEventSink {
    tx: mpsc::UnboundedSender<EngineMessage>,
}

impl BackendEventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<EngineMessage>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: BackendEvent) {
        if self.tx.send(EngineMessage::Backend(event)).is_err() {
            tracing::debug!("Backend event dropped, engine is closed");
        }
    }

    pub fn prepared(&self, load: LoadId) {
        self.send(BackendEvent::Prepared(load));
    }

    pub fn completed(&self, load: LoadId) {
        self.send(BackendEvent::Completed(load));
    }

    pub fn failed(&self, load: LoadId, message: impl Into<String>) {
        self.send(BackendEvent::Failed {
            load,
            message: message.into(),
        });
    }
}

impl fmt::Debug for BackendEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendEventSink")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Platform audio decoder/renderer
///
/// Method calls are made from the engine task only. Implementations that
/// do real work in the background report back through the sink.
pub trait AudioBackend: Send + 'static {
    /// Receive the sink used for prepared/completed/failed events
    ///
    /// Called once, before any other method.
    fn attach(&mut self, sink: BackendEventSink);

    /// Return to the uninitialized state, dropping any source
    fn reset(&mut self) -> BackendResult<()>;

    /// Select the media to play
    ///
    /// An empty or invalid locator must fail here or be reported through
    /// [`BackendEventSink::failed`] instead of `prepared`.
    fn set_source(&mut self, locator: &str) -> BackendResult<()>;

    /// Start preparing the source; completion is reported through the sink
    fn prepare_async(&mut self, load: LoadId) -> BackendResult<()>;

    /// Start or resume rendering
    fn start(&mut self) -> BackendResult<()>;

    fn pause(&mut self) -> BackendResult<()>;

    fn seek_to(&mut self, position_ms: u64) -> BackendResult<()>;

    /// Current playback offset in milliseconds
    fn current_position(&self) -> u64;

    fn is_playing(&self) -> bool;

    /// Stop rendering; a new prepare is needed before `start`
    fn stop(&mut self) -> BackendResult<()>;

    /// Free all native resources; the backend is not used afterwards
    fn release(&mut self);
}
