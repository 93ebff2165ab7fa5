//! WebSocket message types.
//!
//! Both directions use the same envelope: a `type` string for routing and a
//! JSON payload.

use serde::{Deserialize, Serialize};

/// Server -> Client message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub payload: serde_json::Value,
}

impl ServerMessage {
    pub fn new(msg_type: impl Into<String>, payload: impl Serialize) -> Self {
        Self {
            msg_type: msg_type.into(),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn empty(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            payload: serde_json::Value::Null,
        }
    }
}

/// Client -> Server message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// System-level messages (not feature-specific).
pub mod system {
    use serde::{Deserialize, Serialize};

    /// Sent immediately after the connection is established.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Connected {
        pub profile_id: String,
        pub server_version: String,
    }

    /// Heartbeat response (server -> client).
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Pong;

    /// Error message (server -> client).
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Error {
        pub code: String,
        pub message: String,
    }

    impl Error {
        pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
            Self {
                code: code.into(),
                message: message.into(),
            }
        }
    }
}

/// Reserved message type constants.
pub mod msg_types {
    /// Sent by server on successful connection.
    pub const CONNECTED: &str = "connected";
    /// Client heartbeat request.
    pub const PING: &str = "ping";
    /// Server heartbeat response.
    pub const PONG: &str = "pong";
    /// Server error response.
    pub const ERROR: &str = "error";
    /// Mutual match notification (server -> both matched clients).
    pub const MATCH: &str = "match";
}
