pub mod auth;
mod profile_models;
mod profile_store;
mod sqlite_profile_store;

pub use auth::{AuthToken, AuthTokenValue};
pub use profile_models::{DevProfile, NewProfile, ProfileWithSwipes, SwipeKind};
pub use profile_store::{ProfileStore, SwipeRecorded};
pub use sqlite_profile_store::SqliteProfileStore;
