//! Engine configuration

use crate::error::{PlaybackError, Result};
use crate::types::RepeatMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the playback engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Position polling period while playing (default: 500)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound for a backend prepare, 0 waits forever (default: 30000)
    #[serde(default = "default_prepare_timeout_ms")]
    pub prepare_timeout_ms: u64,

    /// Capacity of the event broadcast channel (default: 64)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Fixed shuffle seed for reproducible orders
    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    /// Initial repeat mode (default: Off)
    #[serde(default)]
    pub repeat_mode: RepeatMode,

    /// Initial shuffle flag (default: false)
    #[serde(default)]
    pub shuffle: bool,
}

impl EngineConfig {
    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(PlaybackError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.event_capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "event_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Prepare deadline, `None` when disabled
    pub fn prepare_timeout(&self) -> Option<Duration> {
        (self.prepare_timeout_ms > 0).then(|| Duration::from_millis(self.prepare_timeout_ms))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            prepare_timeout_ms: default_prepare_timeout_ms(),
            event_capacity: default_event_capacity(),
            shuffle_seed: None,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_prepare_timeout_ms() -> u64 {
    30_000
}

fn default_event_capacity() -> usize {
    64
}
