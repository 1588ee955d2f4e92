//! Album entity model and DTOs.

use cadence_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `albums` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Album {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub image_path: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An album joined with its musician's name.
#[derive(Debug, Clone, FromRow)]
pub struct AlbumWithAuthor {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub author_name: String,
}

/// DTO for creating an album.
#[derive(Debug, Deserialize)]
pub struct CreateAlbum {
    pub name: String,
}
