//! Registration payloads for end-to-end tests

use serde_json::{json, Value};

/// Builds a registration body for the given handle, with deterministic
/// name/bio/avatar derived from it.
pub fn profile_body(handle: &str) -> Value {
    json!({
        "handle": handle,
        "name": capitalize(handle),
        "bio": format!("{} writes code", handle),
        "avatar_url": format!("https://example.com/{}.png", handle),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
