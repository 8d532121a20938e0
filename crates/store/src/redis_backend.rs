//! Redis implementation of the durable session backend.
//!
//! Snapshots are stored as JSON strings under `tablevote:session:{id}`
//! with a native Redis expiry, so the durable side needs no sweeper of
//! its own. The connection manager is configured with a short connect
//! timeout and a single retry; per-call latency bounds live in the
//! [`crate::SessionStore`] decorator, not here.

use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use tracing::info;
use vote_core::{Error, Result, Session};

use crate::backend::SessionBackend;

/// Redis key prefix for session snapshots.
const KEY_PREFIX: &str = "tablevote:session:";

/// Redis-backed durable session storage.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connects to Redis. The connection manager reconnects on its own
    /// after transient failures.
    pub async fn connect(url: &str) -> Result<Self> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(500));

        let client =
            Client::open(url).map_err(|e| Error::storage_unavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| Error::storage_unavailable(e.to_string()))?;

        info!(url = %url, "Connected to Redis");

        Ok(Self { conn })
    }

    fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }
}

#[async_trait]
impl SessionBackend for RedisBackend {
    async fn save(&self, session: &Session, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(Self::key(&session.id), payload, ttl.as_secs())
            .await
            .map_err(|e| Error::storage_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(Self::key(id))
            .await
            .map_err(|e| Error::storage_unavailable(e.to_string()))?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn touch(&self, id: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: bool = conn
            .expire(Self::key(id), ttl.as_secs() as i64)
            .await
            .map_err(|e| Error::storage_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(Self::key(id))
            .await
            .map_err(|e| Error::storage_unavailable(e.to_string()))?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::storage_unavailable(e.to_string()))?;
        Ok(())
    }
}
