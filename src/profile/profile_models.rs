//! Developer profile data models

use serde::{Deserialize, Serialize};

/// A developer's public profile, as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevProfile {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
}

/// Input for profile creation at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// A profile together with its like/dislike id lists, in swipe order.
///
/// This is the "acting profile document" returned after a swipe action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileWithSwipes {
    #[serde(flatten)]
    pub profile: DevProfile,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeKind {
    Like,
    Dislike,
}

impl SwipeKind {
    pub fn to_int(&self) -> i32 {
        match self {
            SwipeKind::Like => 1,
            SwipeKind::Dislike => 2,
        }
    }
}
