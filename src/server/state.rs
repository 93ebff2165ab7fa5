use axum::extract::FromRef;

use crate::matching::MatchEngine;
use crate::profile::ProfileStore;
use std::sync::Arc;
use std::time::Instant;

use super::websocket::ConnectionManager;
use super::ServerConfig;

pub type GuardedProfileStore = Arc<dyn ProfileStore>;
pub type GuardedConnectionManager = Arc<ConnectionManager>;
pub type GuardedMatchEngine = Arc<MatchEngine>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub profile_store: GuardedProfileStore,
    pub connection_manager: GuardedConnectionManager,
    pub match_engine: GuardedMatchEngine,
}

impl FromRef<ServerState> for GuardedProfileStore {
    fn from_ref(input: &ServerState) -> Self {
        input.profile_store.clone()
    }
}

impl FromRef<ServerState> for GuardedConnectionManager {
    fn from_ref(input: &ServerState) -> Self {
        input.connection_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedMatchEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.match_engine.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
