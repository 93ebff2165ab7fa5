//! Tindev Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod matching;
pub mod profile;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use matching::MatchEngine;
pub use profile::{ProfileStore, SqliteProfileStore};
pub use server::websocket::ConnectionManager;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
