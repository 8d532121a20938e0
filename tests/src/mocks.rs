//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use session_store::SessionBackend;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use vote_core::{Error, Restaurant, Result, SearchPage, SearchParams, Session};

use places::RestaurantSource;

/// Durable backend backed by an in-memory map, with a failure toggle.
///
/// Implements the same `SessionBackend` trait as the real Redis
/// backend, so tests exercise the full timeout-and-fallback decorator
/// without a Redis server.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Stored snapshots keyed by session id.
    entries: Arc<Mutex<HashMap<String, Session>>>,
    /// Simulate an unreachable backend if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set failure mode for testing fallback behavior.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    /// Snapshot currently stored for an id, if any.
    pub fn stored(&self, id: &str) -> Option<Session> {
        self.entries.lock().get(id).cloned()
    }

    pub fn stored_count(&self) -> usize {
        self.entries.lock().len()
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            Err(Error::storage_unavailable("mock backend failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionBackend for MockBackend {
    async fn save(&self, session: &Session, _ttl: Duration) -> Result<()> {
        self.check()?;
        self.entries
            .lock()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        self.check()?;
        Ok(self.entries.lock().get(id).cloned())
    }

    async fn touch(&self, _id: &str, _ttl: Duration) -> Result<()> {
        self.check()
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check()?;
        self.entries.lock().remove(id);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

/// Restaurant source serving a fixed deck.
pub struct MockPlaces {
    deck: Vec<Restaurant>,
}

impl MockPlaces {
    pub fn new(deck: Vec<Restaurant>) -> Self {
        Self { deck }
    }
}

#[async_trait]
impl RestaurantSource for MockPlaces {
    async fn search(&self, _params: &SearchParams) -> Result<SearchPage> {
        Ok(SearchPage {
            items: self.deck.clone(),
            next_page_token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_mock_backend_failure_toggle() {
        let backend = MockBackend::new();
        let session = fixtures::bare_session();

        backend
            .save(&session, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(backend.stored_count(), 1);

        backend.set_should_fail(true);
        assert!(backend.get(&session.id).await.is_err());

        backend.set_should_fail(false);
        assert!(backend.get(&session.id).await.unwrap().is_some());
    }
}
