use anyhow::Result;

use super::auth::{AuthToken, AuthTokenValue};
use super::profile_models::{DevProfile, NewProfile, ProfileWithSwipes, SwipeKind};

/// Outcome of recording a swipe against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeRecorded {
    /// The target id does not resolve to a profile; nothing was written.
    TargetNotFound,
    /// The swipe was recorded (or already present). `mutual` is true when
    /// this was a like and the target had already liked the actor.
    Recorded { mutual: bool },
}

pub trait ProfileStore: Send + Sync {
    /// Creates a new profile.
    /// Returns Ok(None) if the handle is already taken.
    /// Returns Err if there is a database error.
    fn create_profile(&self, new_profile: &NewProfile) -> Result<Option<DevProfile>>;

    /// Returns a profile given its id.
    /// Returns Ok(None) if the profile does not exist.
    fn get_profile(&self, profile_id: &str) -> Result<Option<DevProfile>>;

    /// Returns a profile with its like/dislike lists in swipe order.
    /// Returns Ok(None) if the profile does not exist.
    fn get_profile_with_swipes(&self, profile_id: &str) -> Result<Option<ProfileWithSwipes>>;

    /// Records a swipe from `actor_id` on `target_id`.
    ///
    /// Target existence check, insert and mutual-like check all run against
    /// the same serialized connection, so two near-simultaneous mutual likes
    /// cannot both miss the match. Repeating an identical swipe is a no-op.
    fn record_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: SwipeKind,
    ) -> Result<SwipeRecorded>;

    /// Returns all profiles except the actor and anything the actor has
    /// already swiped on, in natural (insertion) order.
    fn list_candidates(&self, actor_id: &str) -> Result<Vec<DevProfile>>;

    /// Persists a new auth token.
    fn add_auth_token(&self, token: &AuthToken) -> Result<()>;

    /// Returns the auth token with the given value.
    /// Returns Ok(None) if the token does not exist.
    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Updates the token's last_used timestamp.
    fn touch_auth_token(&self, value: &AuthTokenValue) -> Result<()>;

    /// Deletes an auth token.
    /// Returns Ok(None) if the token did not exist.
    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;
}
