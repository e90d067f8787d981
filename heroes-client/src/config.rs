use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`HeroClient`](crate::HeroClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the heroes collection (e.g. `http://localhost:8080/api/heroes`).
    pub base_url: String,
    /// Prefix used in every notification.
    pub service_name: String,
    /// Per-request timeout. `None` waits for the remote indefinitely.
    pub timeout_ms: Option<u64>,
    /// Maximum entries kept by a [`MessageLog`](crate::MessageLog) built from this config.
    pub log_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/heroes".to_string(),
            service_name: "HeroService".to_string(),
            timeout_ms: None,
            log_capacity: 100,
        }
    }
}

impl ClientConfig {
    /// Base URL without a trailing slash.
    pub fn collection_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
