//! Durable backend port.

use std::time::Duration;

use async_trait::async_trait;
use vote_core::{Error, Result, Session};

/// A durable key-value backend for session snapshots.
///
/// Implemented by [`crate::RedisBackend`] in production and by mock
/// backends in tests. Callers never use this directly; the
/// [`crate::SessionStore`] decorator wraps every call in a latency
/// bound and the fallback policy.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Writes a snapshot with the given expiry.
    async fn save(&self, session: &Session, ttl: Duration) -> Result<()>;

    /// Reads a snapshot, `None` on miss.
    async fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Refreshes the expiry without rewriting the payload.
    async fn touch(&self, id: &str, ttl: Duration) -> Result<()>;

    /// Removes a snapshot. Missing keys are not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<()>;
}

/// Stand-in used when the durable backend could not be reached at
/// startup. Every call fails, so the decorator serves the fallback map
/// (or hard-fails when fallback is disabled).
pub struct OfflineBackend;

#[async_trait]
impl SessionBackend for OfflineBackend {
    async fn save(&self, _session: &Session, _ttl: Duration) -> Result<()> {
        Err(Error::storage_unavailable("durable backend offline"))
    }

    async fn get(&self, _id: &str) -> Result<Option<Session>> {
        Err(Error::storage_unavailable("durable backend offline"))
    }

    async fn touch(&self, _id: &str, _ttl: Duration) -> Result<()> {
        Err(Error::storage_unavailable("durable backend offline"))
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Err(Error::storage_unavailable("durable backend offline"))
    }

    async fn ping(&self) -> Result<()> {
        Err(Error::storage_unavailable("durable backend offline"))
    }
}
