use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
    DEFAULT_TIMESTAMP,
};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::info;

use super::auth::{AuthToken, AuthTokenValue};
use super::profile_models::{DevProfile, NewProfile, ProfileWithSwipes, SwipeKind};
use super::profile_store::{ProfileStore, SwipeRecorded};

/// V 0
const PROFILE_TABLE_V_0: Table = Table {
    name: "profile",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("bio", &SqlType::Text, non_null = true),
        sqlite_column!("avatar_url", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[],
};
const SWIPE_TABLE_V_0: Table = Table {
    name: "swipe",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "profile_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "profile",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "target_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "profile",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("kind", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["profile_id", "target_id", "kind"]],
    indices: &[
        ("idx_swipe_profile_id", "profile_id"),
        ("idx_swipe_target_id", "target_id"),
    ],
};
const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "profile_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "profile",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_auth_token_value", "value")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[PROFILE_TABLE_V_0, SWIPE_TABLE_V_0, AUTH_TOKEN_TABLE_V_0],
    migration: None,
}];

fn unix_secs(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn from_unix_secs(secs: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

#[derive(Clone)]
pub struct SqliteProfileStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProfileStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            VERSIONED_SCHEMAS
                .last()
                .context("No schema versions defined")?
                .create(&conn)?;
            conn
        };

        // The pragma is per-connection, so set it on reopen too
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        if db_version >= VERSIONED_SCHEMAS.len() as i64 {
            bail!("Database version {} is too new", db_version);
        } else {
            VERSIONED_SCHEMAS
                .get(version)
                .context("Failed to get schema")?
                .validate(&conn)?;
        }

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteProfileStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;

        Ok(())
    }

    fn get_profile_on(conn: &Connection, profile_id: &str) -> Result<Option<DevProfile>> {
        let profile = conn
            .query_row(
                "SELECT id, name, bio, avatar_url FROM profile WHERE id = ?1",
                params![profile_id],
                |row| {
                    Ok(DevProfile {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        bio: row.get(2)?,
                        avatar_url: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    fn get_swiped_ids_on(
        conn: &Connection,
        profile_id: &str,
        kind: SwipeKind,
    ) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT target_id FROM swipe WHERE profile_id = ?1 AND kind = ?2 ORDER BY id",
        )?;
        let ids = stmt
            .query_map(params![profile_id, kind.to_int()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

impl ProfileStore for SqliteProfileStore {
    fn create_profile(&self, new_profile: &NewProfile) -> Result<Option<DevProfile>> {
        let conn = self.conn.lock().unwrap();

        let taken: bool = conn
            .query_row(
                "SELECT 1 FROM profile WHERE id = ?1",
                params![new_profile.handle],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if taken {
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO profile (id, name, bio, avatar_url) VALUES (?1, ?2, ?3, ?4)",
            params![
                new_profile.handle,
                new_profile.name,
                new_profile.bio,
                new_profile.avatar_url
            ],
        )
        .with_context(|| format!("Failed to create profile {}", new_profile.handle))?;

        Ok(Some(DevProfile {
            id: new_profile.handle.clone(),
            name: new_profile.name.clone(),
            bio: new_profile.bio.clone(),
            avatar_url: new_profile.avatar_url.clone(),
        }))
    }

    fn get_profile(&self, profile_id: &str) -> Result<Option<DevProfile>> {
        let conn = self.conn.lock().unwrap();
        Self::get_profile_on(&conn, profile_id)
    }

    fn get_profile_with_swipes(&self, profile_id: &str) -> Result<Option<ProfileWithSwipes>> {
        let conn = self.conn.lock().unwrap();
        let profile = match Self::get_profile_on(&conn, profile_id)? {
            Some(profile) => profile,
            None => return Ok(None),
        };
        let likes = Self::get_swiped_ids_on(&conn, profile_id, SwipeKind::Like)?;
        let dislikes = Self::get_swiped_ids_on(&conn, profile_id, SwipeKind::Dislike)?;
        Ok(Some(ProfileWithSwipes {
            profile,
            likes,
            dislikes,
        }))
    }

    fn record_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: SwipeKind,
    ) -> Result<SwipeRecorded> {
        // A single lock around check, insert and mutual lookup keeps the
        // whole operation serialized against concurrent swipes.
        let conn = self.conn.lock().unwrap();

        let target_exists: bool = conn
            .query_row(
                "SELECT 1 FROM profile WHERE id = ?1",
                params![target_id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !target_exists {
            return Ok(SwipeRecorded::TargetNotFound);
        }

        conn.execute(
            "INSERT OR IGNORE INTO swipe (profile_id, target_id, kind) VALUES (?1, ?2, ?3)",
            params![actor_id, target_id, kind.to_int()],
        )
        .with_context(|| format!("Failed to record swipe {} -> {}", actor_id, target_id))?;

        let mutual = match kind {
            SwipeKind::Dislike => false,
            SwipeKind::Like => conn
                .query_row(
                    "SELECT 1 FROM swipe WHERE profile_id = ?1 AND target_id = ?2 AND kind = ?3",
                    params![target_id, actor_id, SwipeKind::Like.to_int()],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false),
        };

        Ok(SwipeRecorded::Recorded { mutual })
    }

    fn list_candidates(&self, actor_id: &str) -> Result<Vec<DevProfile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, bio, avatar_url FROM profile \
             WHERE id != ?1 \
             AND id NOT IN (SELECT target_id FROM swipe WHERE profile_id = ?1) \
             ORDER BY rowid",
        )?;
        let candidates = stmt
            .query_map(params![actor_id], |row| {
                Ok(DevProfile {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    bio: row.get(2)?,
                    avatar_url: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<DevProfile>, _>>()?;
        Ok(candidates)
    }

    fn add_auth_token(&self, token: &AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (profile_id, value, created) VALUES (?1, ?2, ?3)",
            params![token.profile_id, token.value.0, unix_secs(token.created)],
        )
        .context("Failed to add auth token")?;
        Ok(())
    }

    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let token = conn
            .query_row(
                "SELECT profile_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                |row| {
                    Ok(AuthToken {
                        profile_id: row.get(0)?,
                        value: AuthTokenValue(row.get(1)?),
                        created: from_unix_secs(row.get(2)?),
                        last_used: row.get::<_, Option<i64>>(3)?.map(from_unix_secs),
                    })
                },
            )
            .optional()?;
        Ok(token)
    }

    fn touch_auth_token(&self, value: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE auth_token SET last_used = ?1 WHERE value = ?2",
            params![unix_secs(SystemTime::now()), value.0],
        )?;
        Ok(())
    }

    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let token = self.get_auth_token(value)?;
        if token.is_some() {
            let conn = self.conn.lock().unwrap();
            conn.execute("DELETE FROM auth_token WHERE value = ?1", params![value.0])?;
        }
        Ok(token)
    }
}
