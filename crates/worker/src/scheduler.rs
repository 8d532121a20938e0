//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use session_store::SessionStore;
use telemetry::metrics;

use crate::probe::ProbeWorker;
use crate::sweeper::CleanupSweeper;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Fallback-map sweep interval
    pub sweep_interval: Duration,
    /// Durable-backend probe interval
    pub probe_interval: Duration,
    /// Metrics log interval
    pub metrics_log_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(3600), // 1 hour
            probe_interval: Duration::from_secs(15),
            metrics_log_interval: Duration::from_secs(60),
        }
    }
}

/// Background worker scheduler.
pub struct Scheduler {
    config: WorkerConfig,
    store: Arc<SessionStore>,
}

impl Scheduler {
    pub fn new(config: WorkerConfig, store: Arc<SessionStore>) -> Self {
        Self { config, store }
    }

    /// Starts all background workers.
    pub fn start(self: Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();

        // Cleanup sweeper
        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_sweeper().await;
        }));

        // Durable-backend probe + recovery resync
        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_probe().await;
        }));

        // Metrics logger
        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_metrics_log().await;
        }));

        info!("Background workers started");
        handles
    }

    async fn run_sweeper(&self) {
        let sweeper = CleanupSweeper::new(self.store.clone());
        let mut ticker = interval(self.config.sweep_interval);

        loop {
            ticker.tick().await;
            sweeper.run();
        }
    }

    async fn run_probe(&self) {
        let mut probe = ProbeWorker::new(self.store.clone());
        let mut ticker = interval(self.config.probe_interval);

        loop {
            ticker.tick().await;
            probe.run_once().await;
        }
    }

    async fn run_metrics_log(&self) {
        let mut ticker = interval(self.config.metrics_log_interval);

        loop {
            ticker.tick().await;

            let snapshot = metrics().snapshot();
            info!(
                sessions_created = snapshot.sessions_created,
                votes_cast = snapshot.votes_cast,
                matches_detected = snapshot.matches_detected,
                fallback_entries = snapshot.fallback_entries,
                store_timeouts = snapshot.store_timeouts,
                ws_connections = snapshot.ws_connections,
                store_latency_mean_ms = snapshot.store_latency_mean_ms,
                "Metrics snapshot"
            );
        }
    }
}
