//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, ADA};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_candidates() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::registered(server.base_url.clone(), ADA).await;
//!
//!     let response = client.get_candidates().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::profile_body;
#[allow(unused_imports)]
pub use server::TestServer;
