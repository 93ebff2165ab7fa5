//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all tindev-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use super::fixtures::profile_body;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unregistered client
    ///
    /// Use this for testing the registration flow itself.
    /// For most tests, use `registered()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client with a freshly registered profile
    ///
    /// The session cookie set at registration is kept in the cookie store,
    /// so the client is ready to make authenticated requests.
    ///
    /// # Panics
    ///
    /// Panics if registration fails (indicates test infrastructure problem).
    pub async fn registered(base_url: String, handle: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.register(handle).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Test profile registration failed: {:?}",
            response.text().await
        );

        client
    }

    /// Like `registered()`, but also returns the session token from the
    /// response body. Use this when a test needs the raw token, e.g. to
    /// open a WebSocket connection.
    pub async fn registered_with_token(base_url: String, handle: &str) -> (Self, String) {
        let client = Self::new(base_url);

        let response = client.register(handle).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Register body not JSON");
        let token = body["token"]
            .as_str()
            .expect("Register body has no token")
            .to_string();

        (client, token)
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/register with the standard fixture payload
    pub async fn register(&self, handle: &str) -> Response {
        self.register_with_body(&profile_body(handle)).await
    }

    /// POST /v1/auth/register with a custom payload
    pub async fn register_with_body(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/v1/auth/register", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .post(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    // ========================================================================
    // Dev Endpoints
    // ========================================================================

    /// GET /v1/devs
    pub async fn get_candidates(&self) -> Response {
        self.client
            .get(format!("{}/v1/devs", self.base_url))
            .send()
            .await
            .expect("Get candidates request failed")
    }

    /// GET /v1/devs/me
    pub async fn get_me(&self) -> Response {
        self.client
            .get(format!("{}/v1/devs/me", self.base_url))
            .send()
            .await
            .expect("Get me request failed")
    }

    /// POST /v1/devs/{dev_id}/likes
    pub async fn like(&self, dev_id: &str) -> Response {
        self.client
            .post(format!("{}/v1/devs/{}/likes", self.base_url, dev_id))
            .send()
            .await
            .expect("Like request failed")
    }

    /// POST /v1/devs/{dev_id}/dislikes
    pub async fn dislike(&self, dev_id: &str) -> Response {
        self.client
            .post(format!("{}/v1/devs/{}/dislikes", self.base_url, dev_id))
            .send()
            .await
            .expect("Dislike request failed")
    }
}
