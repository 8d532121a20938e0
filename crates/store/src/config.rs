//! Session store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Latency bound for durable writes.
pub const SAVE_TIMEOUT: Duration = Duration::from_millis(1200);
/// Latency bound for durable reads.
pub const GET_TIMEOUT: Duration = Duration::from_millis(500);
/// Latency bound for expiry refreshes.
pub const TOUCH_TIMEOUT: Duration = Duration::from_millis(400);
/// Latency bound for durable deletes (best-effort anyway).
pub const DELETE_TIMEOUT: Duration = Duration::from_millis(500);

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Redis connection URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Whether the in-process fallback map serves reads/writes when
    /// Redis is unreachable. Must be disabled when running more than
    /// one server process.
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,
    /// Snapshot expiry in days.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,
}

fn default_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_fallback_enabled() -> bool {
    true
}

fn default_ttl_days() -> u32 {
    7
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            fallback_enabled: default_fallback_enabled(),
            ttl_days: default_ttl_days(),
        }
    }
}

impl StoreConfig {
    /// Snapshot expiry as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_days) * 24 * 60 * 60)
    }
}
