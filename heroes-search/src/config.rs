use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`SearchPipeline`](crate::SearchPipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet window a term must survive before it is considered (ms).
    pub debounce_ms: u64,
    /// Batches buffered per subscriber before the oldest are skipped.
    pub channel_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            channel_capacity: 16,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
