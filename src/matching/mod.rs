//! Like/dislike recording and mutual-match evaluation.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::profile::{ProfileStore, ProfileWithSwipes, SwipeKind, SwipeRecorded};
use crate::server::websocket::messages::{msg_types, ServerMessage};
use crate::server::websocket::ConnectionManager;

#[derive(Debug, Error)]
pub enum SwipeError {
    /// The target id does not resolve to an existing profile.
    #[error("Dev not exists")]
    TargetNotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Records swipes and pushes `match` events when a like turns out mutual.
pub struct MatchEngine {
    store: Arc<dyn ProfileStore>,
    connections: Arc<ConnectionManager>,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn ProfileStore>, connections: Arc<ConnectionManager>) -> Self {
        Self { store, connections }
    }

    /// Record a swipe from `actor_id` on `target_id` and return the acting
    /// profile document with its updated swipe lists.
    ///
    /// For a like that completes a mutual pair, a `match` event carrying the
    /// other profile's public fields is pushed to each side's registered
    /// channel. A side without a channel is skipped; a failed push affects
    /// neither the recorded swipe nor the other side.
    pub async fn swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: SwipeKind,
    ) -> Result<ProfileWithSwipes, SwipeError> {
        let recorded = self.store.record_swipe(actor_id, target_id, kind)?;

        match recorded {
            SwipeRecorded::TargetNotFound => return Err(SwipeError::TargetNotFound),
            SwipeRecorded::Recorded { mutual: true } => {
                info!("Mutual match: {} <-> {}", actor_id, target_id);
                self.notify_match(actor_id, target_id).await?;
            }
            SwipeRecorded::Recorded { mutual: false } => {}
        }

        self.store
            .get_profile_with_swipes(actor_id)?
            .ok_or(SwipeError::TargetNotFound)
    }

    /// Push a `match` event to both parties, each naming the other profile.
    async fn notify_match(&self, actor_id: &str, target_id: &str) -> Result<(), SwipeError> {
        let actor = self.store.get_profile(actor_id)?;
        let target = self.store.get_profile(target_id)?;

        if let Some(target) = target {
            if let Err(e) = self
                .connections
                .send_to(actor_id, ServerMessage::new(msg_types::MATCH, target))
                .await
            {
                debug!("Match push to {} skipped: {:?}", actor_id, e);
            }
        }
        if let Some(actor) = actor {
            if let Err(e) = self
                .connections
                .send_to(target_id, ServerMessage::new(msg_types::MATCH, actor))
                .await
            {
                debug!("Match push to {} skipped: {:?}", target_id, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{NewProfile, SqliteProfileStore};
    use tempfile::TempDir;

    fn make_engine() -> (TempDir, MatchEngine, Arc<ConnectionManager>) {
        let temp_dir = TempDir::new().unwrap();
        let store: Arc<dyn ProfileStore> =
            Arc::new(SqliteProfileStore::new(temp_dir.path().join("dev.db")).unwrap());
        let connections = Arc::new(ConnectionManager::new());
        let engine = MatchEngine::new(store.clone(), connections.clone());

        for handle in ["ada", "grace"] {
            store
                .create_profile(&NewProfile {
                    handle: handle.to_string(),
                    name: handle.to_uppercase(),
                    bio: String::new(),
                    avatar_url: String::new(),
                })
                .unwrap();
        }

        (temp_dir, engine, connections)
    }

    #[tokio::test]
    async fn like_returns_updated_profile() {
        let (_dir, engine, _connections) = make_engine();

        let doc = engine.swipe("ada", "grace", SwipeKind::Like).await.unwrap();

        assert_eq!(doc.profile.id, "ada");
        assert_eq!(doc.likes, vec!["grace".to_string()]);
    }

    #[tokio::test]
    async fn unknown_target_is_rejected() {
        let (_dir, engine, _connections) = make_engine();

        let result = engine.swipe("ada", "nobody", SwipeKind::Like).await;
        assert!(matches!(result, Err(SwipeError::TargetNotFound)));
    }

    #[tokio::test]
    async fn mutual_like_pushes_match_to_both_sides() {
        let (_dir, engine, connections) = make_engine();
        let (_ada_tx, mut rx_ada) = connections.register("ada").await;
        let (_grace_tx, mut rx_grace) = connections.register("grace").await;

        engine.swipe("ada", "grace", SwipeKind::Like).await.unwrap();
        engine.swipe("grace", "ada", SwipeKind::Like).await.unwrap();

        let to_ada = rx_ada.recv().await.unwrap();
        assert_eq!(to_ada.msg_type, msg_types::MATCH);
        assert_eq!(to_ada.payload["id"], "grace");

        let to_grace = rx_grace.recv().await.unwrap();
        assert_eq!(to_grace.msg_type, msg_types::MATCH);
        assert_eq!(to_grace.payload["id"], "ada");
    }

    #[tokio::test]
    async fn one_sided_like_pushes_nothing() {
        let (_dir, engine, connections) = make_engine();
        let (_grace_tx, mut rx_grace) = connections.register("grace").await;

        engine.swipe("ada", "grace", SwipeKind::Like).await.unwrap();

        assert!(rx_grace.try_recv().is_err());
    }

    #[tokio::test]
    async fn match_with_offline_party_still_notifies_the_other() {
        let (_dir, engine, connections) = make_engine();
        // Only grace is connected
        let (_grace_tx, mut rx_grace) = connections.register("grace").await;

        engine.swipe("ada", "grace", SwipeKind::Like).await.unwrap();
        engine.swipe("grace", "ada", SwipeKind::Like).await.unwrap();

        let to_grace = rx_grace.recv().await.unwrap();
        assert_eq!(to_grace.msg_type, msg_types::MATCH);
        assert_eq!(to_grace.payload["id"], "ada");
    }

    #[tokio::test]
    async fn dislike_never_matches() {
        let (_dir, engine, connections) = make_engine();
        let (_ada_tx, mut rx_ada) = connections.register("ada").await;
        let (_grace_tx, mut rx_grace) = connections.register("grace").await;

        engine
            .swipe("ada", "grace", SwipeKind::Dislike)
            .await
            .unwrap();
        engine
            .swipe("grace", "ada", SwipeKind::Dislike)
            .await
            .unwrap();

        assert!(rx_ada.try_recv().is_err());
        assert!(rx_grace.try_recv().is_err());
    }
}
