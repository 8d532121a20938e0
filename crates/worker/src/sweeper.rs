//! Cleanup sweeper for the in-process fallback map.
//!
//! Redis expires its own entries natively; this only reclaims memory
//! held by the fallback map. No caller depends on its outcome.

use std::sync::Arc;

use session_store::SessionStore;
use telemetry::metrics;
use tracing::{debug, info};

/// Evicts fallback-map sessions older than the store TTL.
pub struct CleanupSweeper {
    store: Arc<SessionStore>,
}

impl CleanupSweeper {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Runs one sweep. Returns the number of sessions evicted.
    pub fn run(&self) -> usize {
        let ttl = self.store.config().ttl();
        let removed = self.store.fallback().sweep_expired(ttl);

        if removed > 0 {
            metrics().sweeper_evictions.inc_by(removed as u64);
            info!(removed, "Swept expired fallback sessions");
        } else {
            debug!("Sweep found no expired fallback sessions");
        }
        removed
    }
}
