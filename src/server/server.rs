use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::error;

use crate::matching::{MatchEngine, SwipeError};
use crate::profile::{AuthToken, AuthTokenValue, DevProfile, NewProfile, ProfileStore, SwipeKind};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::websocket::{ws_handler, ConnectionManager};
use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};
use crate::server::session::Session;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub connected_profiles: usize,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
struct RegisterSuccessResponse {
    token: String,
    profile: DevProfile,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: format!("{}-{}", env!("APP_VERSION"), env!("GIT_HASH")),
        connected_profiles: state.connection_manager.connected_count().await,
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn register(
    State(store): State<GuardedProfileStore>,
    Json(body): Json<NewProfile>,
) -> Response {
    let profile = match store.create_profile(&body) {
        Ok(Some(profile)) => profile,
        Ok(None) => return StatusCode::CONFLICT.into_response(),
        Err(err) => {
            error!("Error creating profile: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let auth_token = AuthToken::issue(&profile.id);
    if let Err(err) = store.add_auth_token(&auth_token) {
        error!("Error persisting auth token: {}", err);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let response_body = RegisterSuccessResponse {
        token: auth_token.value.0.clone(),
        profile,
    };
    let response_body = serde_json::to_string(&response_body).unwrap();

    let cookie_value = HeaderValue::from_str(&format!(
        "session_token={}; Path=/; HttpOnly",
        auth_token.value.0
    ))
    .unwrap();
    response::Builder::new()
        .status(StatusCode::CREATED)
        .header(axum::http::header::SET_COOKIE, cookie_value)
        .body(Body::from(response_body))
        .unwrap()
}

async fn logout(State(store): State<GuardedProfileStore>, session: Session) -> Response {
    match store.delete_auth_token(&AuthTokenValue(session.token)) {
        Ok(Some(_)) => {
            let cookie_value = Cookie::build(Cookie::new("session_token", ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
                .same_site(SameSite::Lax)
                .build();

            response::Builder::new()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
                .unwrap()
        }
        Ok(None) => StatusCode::BAD_REQUEST.into_response(),
        Err(err) => {
            error!("Error deleting auth token: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_me(session: Session, State(store): State<GuardedProfileStore>) -> Response {
    match store.get_profile_with_swipes(&session.profile_id) {
        Ok(Some(doc)) => Json(doc).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Error loading profile {}: {}", session.profile_id, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_candidates(session: Session, State(store): State<GuardedProfileStore>) -> Response {
    match store.list_candidates(&session.profile_id) {
        Ok(candidates) => Json(candidates).into_response(),
        Err(err) => {
            error!("Error listing candidates: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn swipe_response(
    engine: GuardedMatchEngine,
    actor_id: &str,
    target_id: &str,
    kind: SwipeKind,
) -> Response {
    match engine.swipe(actor_id, target_id, kind).await {
        Ok(doc) => Json(doc).into_response(),
        Err(SwipeError::TargetNotFound) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Dev not exists" })),
        )
            .into_response(),
        Err(SwipeError::Storage(err)) => {
            error!("Error recording swipe: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn post_like(
    session: Session,
    State(engine): State<GuardedMatchEngine>,
    Path(dev_id): Path<String>,
) -> Response {
    swipe_response(engine, &session.profile_id, &dev_id, SwipeKind::Like).await
}

async fn post_dislike(
    session: Session,
    State(engine): State<GuardedMatchEngine>,
    Path(dev_id): Path<String>,
) -> Response {
    swipe_response(engine, &session.profile_id, &dev_id, SwipeKind::Dislike).await
}

impl ServerState {
    fn new(
        config: ServerConfig,
        profile_store: Arc<dyn ProfileStore>,
        connection_manager: Arc<ConnectionManager>,
    ) -> ServerState {
        let match_engine = Arc::new(MatchEngine::new(
            profile_store.clone(),
            connection_manager.clone(),
        ));
        ServerState {
            config,
            start_time: Instant::now(),
            profile_store,
            connection_manager,
            match_engine,
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    profile_store: Arc<dyn ProfileStore>,
    connection_manager: Arc<ConnectionManager>,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), profile_store, connection_manager);

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/logout", post(logout))
        .with_state(state.clone());

    let dev_routes: Router = Router::new()
        .route("/", get(get_candidates))
        .route("/me", get(get_me))
        .route("/{dev_id}/likes", post(post_like))
        .route("/{dev_id}/dislikes", post(post_dislike))
        .with_state(state.clone());

    let ws_routes: Router = Router::new()
        .route("/", get(ws_handler))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/devs", dev_routes)
        .nest("/v1/ws", ws_routes);

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    profile_store: Arc<dyn ProfileStore>,
    connection_manager: Arc<ConnectionManager>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(config, profile_store, connection_manager)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
