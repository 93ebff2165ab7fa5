//! WebSocket connection manager.
//!
//! Tracks the active push channel for each connected profile. One channel per
//! profile: a reconnect replaces the previous association, and the socket
//! task removes the association on close.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use super::messages::ServerMessage;

/// Error type for send operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SendError {
    /// No channel is registered for the target profile.
    NotConnected,
    /// The channel is closed (profile disconnected).
    Disconnected,
}

/// Manages all active WebSocket connections, keyed by profile id.
pub struct ConnectionManager {
    connections: RwLock<HashMap<String, mpsc::Sender<ServerMessage>>>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection for the given profile.
    ///
    /// Returns the channel's sender as a registration handle together with a
    /// receiver for outgoing messages. The caller should forward messages
    /// from the receiver to the WebSocket and hand the sender back to
    /// `unregister` on close.
    ///
    /// If a connection already exists for this profile, the old sender is
    /// dropped (drop-and-replace).
    pub async fn register(
        &self,
        profile_id: impl Into<String>,
    ) -> (mpsc::Sender<ServerMessage>, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(32);
        self.connections
            .write()
            .await
            .insert(profile_id.into(), tx.clone());
        (tx, rx)
    }

    /// Unregister a connection (called on disconnect).
    ///
    /// The entry is removed only while it still belongs to `handle`. A stale
    /// socket closing after a reconnect must not evict the registration that
    /// replaced it.
    pub async fn unregister(&self, profile_id: &str, handle: &mpsc::Sender<ServerMessage>) {
        let mut conns = self.connections.write().await;
        if conns
            .get(profile_id)
            .is_some_and(|current| current.same_channel(handle))
        {
            conns.remove(profile_id);
        }
    }

    /// Send a message to a profile's registered channel.
    pub async fn send_to(&self, profile_id: &str, message: ServerMessage) -> Result<(), SendError> {
        let conns = self.connections.read().await;
        match conns.get(profile_id) {
            Some(sender) => sender
                .send(message)
                .await
                .map_err(|_| SendError::Disconnected),
            None => Err(SendError::NotConnected),
        }
    }

    /// Check if a profile has a registered channel.
    pub async fn is_connected(&self, profile_id: &str) -> bool {
        self.connections.read().await.contains_key(profile_id)
    }

    /// Number of profiles with a registered channel.
    pub async fn connected_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
