//! Track entity model and DTOs.

use cadence_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tracks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub user_id: DbId,
    pub album_id: Option<DbId>,
    pub name: String,
    pub file_path: String,
    pub listen_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A track joined with its musician's name, as shown in listings.
#[derive(Debug, Clone, FromRow)]
pub struct TrackWithAuthor {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub file_path: String,
    pub author_name: String,
}

/// DTO for inserting a track.
#[derive(Debug, Deserialize)]
pub struct CreateTrack {
    pub user_id: DbId,
    pub name: String,
    pub file_path: String,
}
