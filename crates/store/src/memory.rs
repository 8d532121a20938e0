//! In-process fallback map for session snapshots.
//!
//! Process-wide state with an explicit lifecycle: created at startup,
//! injected into the [`crate::SessionStore`] (tests pass a fresh
//! instance), swept periodically by the cleanup worker. Not shared
//! across server processes.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use telemetry::metrics;
use vote_core::Session;

/// In-process session snapshot map keyed by session id.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        let mut entries = self.entries.write();
        entries.insert(session.id.clone(), session);
        metrics().fallback_entries.set(entries.len() as u64);
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.entries.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Session> {
        let mut entries = self.entries.write();
        let removed = entries.remove(id);
        metrics().fallback_entries.set(entries.len() as u64);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of all held sessions, for resync.
    pub fn all(&self) -> Vec<Session> {
        self.entries.read().values().cloned().collect()
    }

    /// Evicts sessions created more than `ttl` ago. Returns the number
    /// removed.
    pub fn sweep_expired(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(7));

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, session| session.created_at > cutoff);
        let removed = before - entries.len();
        metrics().fallback_entries.set(entries.len() as u64);
        removed
    }
}
