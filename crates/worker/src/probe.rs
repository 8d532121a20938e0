//! Durable-backend health probe with automatic fallback resync.
//!
//! Pings Redis on an interval, keeps the health registry current, and
//! on an unhealthy-to-healthy edge bulk-writes the fallback map back
//! into Redis so nothing accumulated during the outage is stranded in
//! process memory.

use std::sync::Arc;

use session_store::SessionStore;
use telemetry::health;
use tracing::{info, warn};

/// Probes the durable backend and resyncs the fallback map on
/// recovery.
pub struct ProbeWorker {
    store: Arc<SessionStore>,
    was_healthy: bool,
}

impl ProbeWorker {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            was_healthy: false,
        }
    }

    /// Runs one probe cycle.
    pub async fn run_once(&mut self) {
        let healthy = match self.store.ping().await {
            Ok(()) => {
                health().redis.set_healthy();
                true
            }
            Err(e) => {
                health().redis.set_unhealthy(e.to_string());
                false
            }
        };

        let fallback_enabled = self.store.config().fallback_enabled;
        health().set_fallback_active(fallback_enabled && !healthy);

        if healthy && !self.was_healthy {
            let written = self.store.resync_fallback_to_durable().await;
            if written > 0 {
                info!(written, "Resynced fallback sessions to durable store");
            }
        } else if !healthy {
            warn!("Durable backend unreachable; fallback map is serving");
        }

        self.was_healthy = healthy;
    }
}
