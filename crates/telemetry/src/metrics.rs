//! Internal metrics collection.
//!
//! Counters are collected in-memory and logged periodically by the
//! background scheduler; there is no external metrics system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the tablevote backend.
#[derive(Debug, Default)]
pub struct Metrics {
    // Session lifecycle
    pub sessions_created: Counter,
    pub participants_joined: Counter,
    pub votes_cast: Counter,
    pub matches_detected: Counter,
    pub sessions_finished: Counter,
    pub sessions_deleted: Counter,

    // Store behavior
    pub store_fallback_reads: Counter,
    pub store_fallback_writes: Counter,
    pub store_timeouts: Counter,
    pub resynced_sessions: Counter,
    pub sweeper_evictions: Counter,

    // Latency histograms
    pub store_latency_ms: Histogram,
    pub request_latency_ms: Histogram,

    // Gauges
    pub fallback_entries: Gauge,
    pub ws_connections: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub sessions_created: u64,
    pub participants_joined: u64,
    pub votes_cast: u64,
    pub matches_detected: u64,
    pub sessions_finished: u64,
    pub sessions_deleted: u64,
    pub store_fallback_reads: u64,
    pub store_fallback_writes: u64,
    pub store_timeouts: u64,
    pub resynced_sessions: u64,
    pub sweeper_evictions: u64,
    pub store_latency_mean_ms: f64,
    pub request_latency_mean_ms: f64,
    pub fallback_entries: u64,
    pub ws_connections: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            sessions_created: self.sessions_created.get(),
            participants_joined: self.participants_joined.get(),
            votes_cast: self.votes_cast.get(),
            matches_detected: self.matches_detected.get(),
            sessions_finished: self.sessions_finished.get(),
            sessions_deleted: self.sessions_deleted.get(),
            store_fallback_reads: self.store_fallback_reads.get(),
            store_fallback_writes: self.store_fallback_writes.get(),
            store_timeouts: self.store_timeouts.get(),
            resynced_sessions: self.resynced_sessions.get(),
            sweeper_evictions: self.sweeper_evictions.get(),
            store_latency_mean_ms: self.store_latency_ms.mean(),
            request_latency_mean_ms: self.request_latency_ms.mean(),
            fallback_entries: self.fallback_entries.get(),
            ws_connections: self.ws_connections.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
