//! Repository for the `playlists` and `playlist_tracks` tables.

use cadence_core::types::DbId;
use sqlx::PgPool;

use crate::models::playlist::{Playlist, UpdatePlaylist};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, image_path, created_at, updated_at";

/// Provides CRUD operations for playlists and their track links.
pub struct PlaylistRepo;

impl PlaylistRepo {
    /// Insert a new playlist owned by `user_id`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
    ) -> Result<Playlist, sqlx::Error> {
        let query = format!(
            "INSERT INTO playlists (user_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Find a playlist by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Playlist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playlists WHERE id = $1");
        sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of a user's playlists ordered by name.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Playlist>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playlists WHERE user_id = $1 \
             ORDER BY name, id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM playlists WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Rename a playlist and drop the listed tracks in one transaction.
    ///
    /// Returns `None` if no playlist with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlaylist,
    ) -> Result<Option<Playlist>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("UPDATE playlists SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let playlist = sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(&mut *tx)
            .await?;

        if playlist.is_some() && !input.remove_track_ids.is_empty() {
            sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = $1 AND track_id = ANY($2)")
                .bind(id)
                .bind(&input.remove_track_ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(playlist)
    }

    /// Delete a playlist. Its track links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Link a track to a playlist. Returns `false` if it was already there.
    pub async fn add_track(
        pool: &PgPool,
        playlist_id: DbId,
        track_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO playlist_tracks (playlist_id, track_id)
             VALUES ($1, $2)
             ON CONFLICT (playlist_id, track_id) DO NOTHING",
        )
        .bind(playlist_id)
        .bind(track_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
