//! Playlist entity model and DTOs.

use cadence_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name given to every freshly created playlist.
pub const DEFAULT_PLAYLIST_NAME: &str = "New Playlist";

/// A row from the `playlists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Playlist {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub image_path: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for renaming a playlist and dropping some of its tracks.
#[derive(Debug, Deserialize)]
pub struct UpdatePlaylist {
    pub name: String,
    #[serde(default)]
    pub remove_track_ids: Vec<DbId>,
}
