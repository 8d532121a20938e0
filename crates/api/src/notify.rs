//! Real-time notifier: per-session broadcast fan-out.
//!
//! Each session gets its own `tokio::sync::broadcast` channel; every
//! WebSocket subscribed to that session holds a receiver. Publishing
//! is fire-and-forget: it runs only after the store write succeeded,
//! and a failed or receiver-less send never reaches the HTTP caller.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use vote_core::{Participant, Restaurant};

/// Capacity per session channel. Slow receivers that fall behind skip
/// messages (RecvError::Lagged).
const CHANNEL_CAPACITY: usize = 256;

/// A session-state delta pushed to subscribed sockets.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum SessionEvent {
    /// A participant joined; carries the full roster.
    #[serde(rename = "participant:joined")]
    ParticipantJoined {
        participant: Participant,
        participants: Vec<Participant>,
    },
    /// Live tally delta for one restaurant. Best-effort, not persisted.
    #[serde(rename = "session:vote")]
    Vote {
        restaurant_id: String,
        yes: u32,
        no: u32,
        matched: bool,
    },
    /// The session found its match.
    #[serde(rename = "session:matched")]
    Matched {
        winner_id: String,
        winner: Option<Restaurant>,
        yes_count: u32,
    },
    /// Every participant exhausted their deck.
    #[serde(rename = "session:finished")]
    Finished { session_id: String },
    /// One participant exhausted their deck.
    #[serde(rename = "participant:done")]
    ParticipantDone { participant_id: String },
}

/// Publish/subscribe hub keyed by session id. Cloneable; stored in the
/// app state.
#[derive(Clone, Default)]
pub struct Notifier {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<SessionEvent>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a socket to a session's channel.
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<SessionEvent> {
        let mut channels = self.channels.lock();
        channels
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publishes an event to all sockets on a session's channel.
    /// Fire-and-forget: no subscribers is not an error.
    pub fn publish(&self, session_id: &str, event: SessionEvent) {
        let sender = self.channels.lock().get(session_id).cloned();
        if let Some(sender) = sender {
            if let Err(e) = sender.send(event) {
                debug!(session_id = %session_id, error = %e, "No live subscribers for event");
            }
        }
    }

    /// Drops a session's channel, disconnecting its subscribers.
    pub fn remove(&self, session_id: &str) {
        self.channels.lock().remove(session_id);
    }

    /// Drops a session's channel if nobody is subscribed anymore.
    /// Called from socket teardown so channels do not outlive their
    /// last subscriber; a later subscribe recreates the channel.
    pub fn release(&self, session_id: &str) {
        let mut channels = self.channels.lock();
        if let Some(sender) = channels.get(session_id) {
            if sender.receiver_count() == 0 {
                channels.remove(session_id);
            }
        }
    }

    /// Number of live session channels.
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    /// Number of sockets currently subscribed to a session.
    pub fn subscriber_count(&self, session_id: &str) -> usize {
        self.channels
            .lock()
            .get(session_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}
