//! Progress polling task
//!
//! While a track plays, a background task ticks every poll interval and
//! asks the engine to refresh the position. Each run gets a generation
//! number; the engine ignores ticks from any run but the current one, so
//! a tick already queued when the run was cancelled is harmless.

use crate::actor::EngineMessage;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub(crate) struct ProgressPoller {
    interval: Duration,
    generation: u64,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressPoller {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            token: None,
            handle: None,
        }
    }

    /// Start a new run, superseding the previous one
    pub(crate) fn start(&mut self, tx: mpsc::UnboundedSender<EngineMessage>) {
        self.cancel();

        let generation = self.generation;
        let token = CancellationToken::new();
        let child = token.clone();
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    _ = ticker.tick() => {
                        if tx.send(EngineMessage::Tick { generation }).is_err() {
                            break;
                        }
                    }
                }
            }
        }));
        self.token = Some(token);

        tracing::trace!(generation, "Progress polling started");
    }

    /// Stop the current run; its pending ticks become stale
    pub(crate) fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
            tracing::trace!(generation = self.generation, "Progress polling cancelled");
        }
        self.handle = None;
        self.generation += 1;
    }

    /// Whether a tick belongs to the running generation
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.token.is_some() && generation == self.generation
    }

    /// Cancel and wait for the task to exit
    pub(crate) async fn shutdown(&mut self) {
        let handle = self.handle.take();
        self.cancel();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!("Progress polling task ended abnormally: {}", e);
            }
        }
    }
}
