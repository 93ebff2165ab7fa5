//! Session token types.
//!
//! Tokens are opaque random strings handed out at registration and validated
//! on every request. There is no password material here; registration is the
//! only entry point and the token is the whole credential.

use std::time::SystemTime;

use rand::{rng, Rng};
use rand_distr::Alphanumeric;

const TOKEN_LENGTH: usize = 48;

/// A random A-z0-9 string
fn random_string(len: usize) -> String {
    let bytes = rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .collect::<Vec<u8>>();
    String::from_utf8_lossy(&bytes).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthTokenValue(pub String);

impl AuthTokenValue {
    pub fn generate() -> Self {
        AuthTokenValue(random_string(TOKEN_LENGTH))
    }
}

#[derive(Debug, Clone)]
pub struct AuthToken {
    pub profile_id: String,
    pub value: AuthTokenValue,
    pub created: SystemTime,
    pub last_used: Option<SystemTime>,
}

impl AuthToken {
    pub fn issue(profile_id: impl Into<String>) -> Self {
        AuthToken {
            profile_id: profile_id.into(),
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        }
    }
}
