//! WebSocket route handler.
//!
//! Handles WebSocket upgrade, message loop, and cleanup.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{
    connection::ConnectionManager,
    messages::{msg_types, system, ClientMessage, ServerMessage},
};
use crate::server::session::Session;
use crate::server::state::GuardedConnectionManager;

/// WebSocket upgrade handler.
///
/// This is the route handler for `GET /v1/ws`. The session extractor has
/// already resolved the connecting profile, so the registry is never keyed
/// on anything the client merely claims to be.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    session: Session,
    State(connection_manager): State<GuardedConnectionManager>,
) -> Response {
    debug!("WebSocket upgrade for profile {}", session.profile_id);
    ws.on_upgrade(move |socket| handle_socket(socket, session.profile_id, connection_manager))
}

/// Handle an established WebSocket connection.
async fn handle_socket(
    socket: WebSocket,
    profile_id: String,
    connection_manager: Arc<ConnectionManager>,
) {
    debug!("WebSocket connected: profile {}", profile_id);

    // Register connection and get receiver for outgoing messages; the
    // sender doubles as the handle for socket-scoped unregistration
    let (registration, outgoing_rx) = connection_manager.register(profile_id.clone()).await;

    let (ws_sink, ws_stream) = socket.split();

    let connected_msg = ServerMessage::new(
        msg_types::CONNECTED,
        system::Connected {
            profile_id: profile_id.clone(),
            server_version: format!("{}-{}", env!("APP_VERSION"), env!("GIT_HASH")),
        },
    );

    // Spawn task to forward outgoing messages to the WebSocket
    let outgoing_handle = tokio::spawn(forward_outgoing(ws_sink, outgoing_rx, connected_msg));

    // Process incoming messages until the socket closes
    process_incoming(ws_stream, &profile_id, &connection_manager).await;

    debug!("WebSocket disconnected: profile {}", profile_id);
    outgoing_handle.abort();

    // Only drops the association if no reconnect has replaced it
    connection_manager.unregister(&profile_id, &registration).await;
}

/// Forward messages from the outgoing channel to the WebSocket.
async fn forward_outgoing(
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut outgoing_rx: mpsc::Receiver<ServerMessage>,
    initial_msg: ServerMessage,
) {
    // Send initial connected message
    if let Ok(json) = serde_json::to_string(&initial_msg) {
        if ws_sink.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    // Forward all subsequent messages
    while let Some(msg) = outgoing_rx.recv().await {
        match serde_json::to_string(&msg) {
            Ok(json) => {
                if ws_sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to serialize WebSocket message: {}", e);
            }
        }
    }
}

/// Process incoming messages from the WebSocket.
async fn process_incoming(
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    profile_id: &str,
    connection_manager: &ConnectionManager,
) {
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    handle_client_message(profile_id, msg, connection_manager).await;
                }
                Err(e) => {
                    debug!("Failed to parse client message: {}", e);
                    let error_msg = ServerMessage::new(
                        msg_types::ERROR,
                        system::Error::new("parse_error", format!("Invalid message format: {}", e)),
                    );
                    let _ = connection_manager.send_to(profile_id, error_msg).await;
                }
            },
            Ok(Message::Binary(_)) => {
                debug!("Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                // Axum/tungstenite handles pong automatically
                debug!("Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!("Received pong");
            }
            Ok(Message::Close(_)) => {
                debug!("Received close frame");
                break;
            }
            Err(e) => {
                debug!("WebSocket error: {}", e);
                break;
            }
        }
    }
}

/// Handle a parsed client message.
async fn handle_client_message(
    profile_id: &str,
    msg: ClientMessage,
    connection_manager: &ConnectionManager,
) {
    match msg.msg_type.as_str() {
        msg_types::PING => {
            let pong = ServerMessage::new(msg_types::PONG, system::Pong);
            let _ = connection_manager.send_to(profile_id, pong).await;
        }
        other => {
            debug!("Unknown message type: {}", other);
            let error_msg = ServerMessage::new(
                msg_types::ERROR,
                system::Error::new("unknown_type", format!("Unknown message type: {}", other)),
            );
            let _ = connection_manager.send_to(profile_id, error_msg).await;
        }
    }
}
