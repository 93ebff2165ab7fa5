//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (profile handles, payload shapes, etc.),
//! update only this file.

// ============================================================================
// Test Profile Handles
// ============================================================================

/// Default acting profile in most tests
pub const ADA: &str = "ada";

/// Second profile, usually the swipe target
pub const GRACE: &str = "grace";

/// Third profile, used for candidate listing checks
pub const LINUS: &str = "linus";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Maximum time to wait for a WebSocket message (seconds)
pub const WS_MESSAGE_TIMEOUT_SECS: u64 = 5;
