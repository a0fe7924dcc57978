//! Clock-driven backend without audio output
//!
//! Plays a fixed library of locators in real (tokio) time: prepare takes a
//! configurable delay, position follows the clock and completion fires when
//! the track length is reached. Used by the CLI and by tests running under
//! a paused clock.

use crate::backend::{AudioBackend, BackendEventSink, LoadId};
use crate::error::{BackendError, BackendResult};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Source {
    locator: String,
    length: Option<Duration>,
}

/// In-memory backend that simulates decoding by the clock
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    library: HashMap<String, Duration>,
    prepare_delay: Duration,
    sink: Option<BackendEventSink>,

    source: Option<Source>,
    load: Option<LoadId>,
    prepared: bool,

    /// Position accumulated before the current run
    offset: Duration,
    /// Set while rendering
    started_at: Option<Instant>,

    /// Pending prepare or completion timer
    timer: Option<CancellationToken>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a playable locator
    pub fn with_track(mut self, locator: impl Into<String>, length: Duration) -> Self {
        self.library.insert(locator.into(), length);
        self
    }

    /// Time between `prepare_async` and the prepared event
    pub fn with_prepare_delay(mut self, delay: Duration) -> Self {
        self.prepare_delay = delay;
        self
    }

    pub fn add_track(&mut self, locator: impl Into<String>, length: Duration) {
        self.library.insert(locator.into(), length);
    }

    fn length(&self) -> Duration {
        self.source
            .as_ref()
            .and_then(|s| s.length)
            .unwrap_or_default()
    }

    fn position(&self) -> Duration {
        let elapsed = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();
        (self.offset + elapsed).min(self.length())
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }

    /// Stop the clock once the end of the track has been rendered
    fn settle(&mut self) {
        if self.started_at.is_some() && self.position() >= self.length() {
            self.offset = self.length();
            self.started_at = None;
        }
    }

    fn arm_timer<F>(&mut self, delay: Duration, fire: F)
    where
        F: FnOnce(&BackendEventSink) + Send + 'static,
    {
        self.cancel_timer();

        let Some(sink) = self.sink.clone() else {
            return;
        };

        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = child.cancelled() => {}
                () = tokio::time::sleep(delay) => fire(&sink),
            }
        });
        self.timer = Some(token);
    }

    fn schedule_completion(&mut self) {
        let Some(load) = self.load else {
            return;
        };

        let remaining = self.length().saturating_sub(self.offset);
        trace!(%load, ?remaining, "Scheduling completion");
        self.arm_timer(remaining, move |sink| sink.completed(load));
    }

    fn require_prepared(&self) -> BackendResult<()> {
        if self.prepared {
            Ok(())
        } else {
            Err(BackendError::NotPrepared)
        }
    }
}

impl AudioBackend for SimulatedBackend {
    fn attach(&mut self, sink: BackendEventSink) {
        self.sink = Some(sink);
    }

    fn reset(&mut self) -> BackendResult<()> {
        self.cancel_timer();
        self.source = None;
        self.load = None;
        self.prepared = false;
        self.offset = Duration::ZERO;
        self.started_at = None;
        Ok(())
    }

    fn set_source(&mut self, locator: &str) -> BackendResult<()> {
        if locator.trim().is_empty() {
            return Err(BackendError::InvalidSource(locator.to_string()));
        }

        self.source = Some(Source {
            locator: locator.to_string(),
            length: self.library.get(locator).copied(),
        });
        Ok(())
    }

    fn prepare_async(&mut self, load: LoadId) -> BackendResult<()> {
        let Some(source) = self.source.clone() else {
            return Err(BackendError::NotPrepared);
        };

        debug!(%load, locator = %source.locator, "Preparing simulated source");
        self.load = Some(load);
        self.prepared = source.length.is_some();

        // Unknown locators fail the same way a decoder would: asynchronously
        self.arm_timer(self.prepare_delay, move |sink| match source.length {
            Some(_) => sink.prepared(load),
            None => sink.failed(load, format!("Cannot open {}", source.locator)),
        });
        Ok(())
    }

    fn start(&mut self) -> BackendResult<()> {
        self.require_prepared()?;
        self.settle();
        if self.started_at.is_some() {
            return Ok(());
        }

        self.offset = self.position();
        if self.offset >= self.length() {
            self.offset = Duration::ZERO;
        }
        self.started_at = Some(Instant::now());
        self.schedule_completion();
        Ok(())
    }

    fn pause(&mut self) -> BackendResult<()> {
        self.require_prepared()?;
        self.settle();

        self.offset = self.position();
        self.started_at = None;
        self.cancel_timer();
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> BackendResult<()> {
        self.require_prepared()?;
        self.settle();

        self.offset = Duration::from_millis(position_ms).min(self.length());
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
            self.schedule_completion();
        }
        Ok(())
    }

    fn current_position(&self) -> u64 {
        u64::try_from(self.position().as_millis()).unwrap_or(u64::MAX)
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some() && self.position() < self.length()
    }

    fn stop(&mut self) -> BackendResult<()> {
        self.cancel_timer();
        self.started_at = None;
        self.offset = Duration::ZERO;
        self.prepared = false;
        Ok(())
    }

    fn release(&mut self) {
        self.cancel_timer();
        self.sink = None;
    }
}
