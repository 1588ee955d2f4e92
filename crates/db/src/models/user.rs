//! User entity model and DTOs.

use cadence_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash. Never serialize this directly; use
/// [`UserProfile`] for API output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub birthday: NaiveDate,
    /// Stored avatar path, empty when the user never uploaded one.
    pub avatar_path: String,
    pub free_tracks: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The caller's own profile.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub free_tracks: i32,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            free_tracks: user.free_tracks,
        }
    }
}

/// DTO for inserting a user. The password is already hashed.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub birthday: NaiveDate,
}

/// A musician with catalog and listening totals.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MusicianSummary {
    pub id: DbId,
    pub name: String,
    pub track_count: i64,
    pub album_count: i64,
    /// Sum of `listen_count` over the musician's tracks.
    pub total_listens: i64,
}
