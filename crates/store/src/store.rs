//! The timeout-and-fallback decorator over the durable backend.
//!
//! Every durable call races against a latency bound; a slow backend
//! never blocks a caller past the bound (the abandoned call's result
//! is discarded). On failure or timeout the in-process fallback map
//! serves the call when enabled; when disabled the error surfaces as
//! `StorageUnavailable` so no write is ever silently lost.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use telemetry::metrics;
use tokio::time::timeout;
use tracing::{debug, warn};
use vote_core::{Error, Result, Session};

use crate::backend::SessionBackend;
use crate::config::{StoreConfig, DELETE_TIMEOUT, GET_TIMEOUT, SAVE_TIMEOUT, TOUCH_TIMEOUT};
use crate::memory::MemoryStore;

/// Session store composing the durable backend with the fallback map.
///
/// Also owns the per-session write locks: all read-modify-write
/// traffic goes through [`SessionStore::update`], which serializes
/// mutations per session id so concurrent votes cannot clobber each
/// other. Operations on different sessions never contend.
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    fallback: Arc<MemoryStore>,
    config: StoreConfig,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionStore {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        fallback: Arc<MemoryStore>,
        config: StoreConfig,
    ) -> Self {
        Self {
            backend,
            fallback,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn fallback(&self) -> &Arc<MemoryStore> {
        &self.fallback
    }

    /// Persists a snapshot with the configured TTL.
    pub async fn save(&self, session: &Session) -> Result<()> {
        let start = Instant::now();
        let result = timeout(SAVE_TIMEOUT, self.backend.save(session, self.config.ttl())).await;
        metrics()
            .store_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => self.save_fallback(session, e),
            Err(_) => {
                metrics().store_timeouts.inc();
                self.save_fallback(
                    session,
                    Error::Timeout {
                        op: "save",
                        bound_ms: SAVE_TIMEOUT.as_millis() as u64,
                    },
                )
            }
        }
    }

    fn save_fallback(&self, session: &Session, cause: Error) -> Result<()> {
        if !self.config.fallback_enabled {
            return Err(Error::storage_unavailable(cause.to_string()));
        }
        warn!(session_id = %session.id, error = %cause, "Durable save failed, using fallback map");
        metrics().store_fallback_writes.inc();
        self.fallback.insert(session.clone());
        Ok(())
    }

    /// Loads a snapshot, `None` if absent everywhere.
    pub async fn get(&self, id: &str) -> Result<Option<Session>> {
        match timeout(GET_TIMEOUT, self.backend.get(id)).await {
            Ok(Ok(Some(session))) => Ok(Some(session)),
            Ok(Ok(None)) => {
                if self.config.fallback_enabled {
                    Ok(self.fallback.get(id))
                } else {
                    Ok(None)
                }
            }
            Ok(Err(e)) => self.get_fallback(id, e),
            Err(_) => {
                metrics().store_timeouts.inc();
                self.get_fallback(
                    id,
                    Error::Timeout {
                        op: "get",
                        bound_ms: GET_TIMEOUT.as_millis() as u64,
                    },
                )
            }
        }
    }

    fn get_fallback(&self, id: &str, cause: Error) -> Result<Option<Session>> {
        if !self.config.fallback_enabled {
            return Err(Error::storage_unavailable(cause.to_string()));
        }
        debug!(session_id = %id, error = %cause, "Durable get failed, reading fallback map");
        metrics().store_fallback_reads.inc();
        Ok(self.fallback.get(id))
    }

    /// Read-modify-write under the session's write lock. Returns
    /// `None` if the session does not exist; otherwise the mutator's
    /// value alongside the persisted session.
    pub async fn update<T, F>(&self, id: &str, mutate: F) -> Result<Option<(Session, T)>>
    where
        F: FnOnce(&mut Session) -> Result<T> + Send,
        T: Send,
    {
        let lock = self.session_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.update_locked(id, mutate).await
        };
        drop(lock);
        self.release_lock_if_idle(id);
        result
    }

    async fn update_locked<T, F>(&self, id: &str, mutate: F) -> Result<Option<(Session, T)>>
    where
        F: FnOnce(&mut Session) -> Result<T> + Send,
        T: Send,
    {
        let Some(mut session) = self.get(id).await? else {
            return Ok(None);
        };
        let value = mutate(&mut session)?;
        self.save(&session).await?;
        Ok(Some((session, value)))
    }

    /// Refreshes the durable expiry. Fallback entries expire by
    /// creation age, so there is nothing to refresh on that side.
    pub async fn touch(&self, id: &str) -> Result<()> {
        match timeout(TOUCH_TIMEOUT, self.backend.touch(id, self.config.ttl())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => self.touch_fallback(id, e),
            Err(_) => {
                metrics().store_timeouts.inc();
                self.touch_fallback(
                    id,
                    Error::Timeout {
                        op: "touch",
                        bound_ms: TOUCH_TIMEOUT.as_millis() as u64,
                    },
                )
            }
        }
    }

    fn touch_fallback(&self, id: &str, cause: Error) -> Result<()> {
        if !self.config.fallback_enabled {
            return Err(Error::storage_unavailable(cause.to_string()));
        }
        debug!(session_id = %id, error = %cause, "Durable touch failed, ignored");
        Ok(())
    }

    /// Removes from both sides. Best-effort on the durable side,
    /// always effective on the fallback side.
    pub async fn delete(&self, id: &str) -> Result<()> {
        match timeout(DELETE_TIMEOUT, self.backend.delete(id)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(session_id = %id, error = %e, "Durable delete failed, fallback still cleared")
            }
            Err(_) => {
                metrics().store_timeouts.inc();
                warn!(session_id = %id, "Durable delete timed out, fallback still cleared");
            }
        }

        self.fallback.remove(id);
        self.locks.lock().remove(id);
        Ok(())
    }

    /// Bulk-writes every fallback entry into the durable backend.
    /// Entries written successfully are released from the fallback
    /// map. Returns the count written.
    pub async fn resync_fallback_to_durable(&self) -> usize {
        let mut written = 0;
        for session in self.fallback.all() {
            let result =
                timeout(SAVE_TIMEOUT, self.backend.save(&session, self.config.ttl())).await;
            match result {
                Ok(Ok(())) => {
                    self.fallback.remove(&session.id);
                    written += 1;
                }
                Ok(Err(e)) => {
                    warn!(session_id = %session.id, error = %e, "Resync write failed");
                }
                Err(_) => {
                    warn!(session_id = %session.id, "Resync write timed out");
                }
            }
        }
        if written > 0 {
            metrics().resynced_sessions.inc_by(written as u64);
        }
        written
    }

    /// Probes the durable backend.
    pub async fn ping(&self) -> Result<()> {
        timeout(GET_TIMEOUT, self.backend.ping())
            .await
            .map_err(|_| Error::Timeout {
                op: "ping",
                bound_ms: GET_TIMEOUT.as_millis() as u64,
            })?
    }

    fn session_lock(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drops a session's lock entry once no task holds a clone.
    /// Sessions that end without an explicit delete (Redis TTL expiry,
    /// sweeper eviction) would otherwise leak their entry; a later
    /// update recreates it.
    fn release_lock_if_idle(&self, id: &str) {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(id) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(id);
            }
        }
    }
}
