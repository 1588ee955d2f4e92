//! Repository for the `tracks` table.

use cadence_core::types::DbId;
use sqlx::PgPool;

use super::like_prefix;
use crate::models::track::{CreateTrack, Track, TrackWithAuthor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, album_id, name, file_path, listen_count, created_at, updated_at";

/// Tracks joined with their musician, aliased for [`TrackWithAuthor`].
const WITH_AUTHOR: &str = "\
    SELECT t.id, t.user_id, t.name, t.file_path, u.name AS author_name \
    FROM tracks t JOIN users u ON u.id = t.user_id";

/// Provides CRUD and listing operations for tracks.
pub struct TrackRepo;

impl TrackRepo {
    /// Insert a new track, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTrack) -> Result<Track, sqlx::Error> {
        let query = format!(
            "INSERT INTO tracks (user_id, name, file_path)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.file_path)
            .fetch_one(pool)
            .await
    }

    /// Find a track by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = $1");
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a track together with its musician's name.
    pub async fn find_with_author(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TrackWithAuthor>, sqlx::Error> {
        let query = format!("{WITH_AUTHOR} WHERE t.id = $1");
        sqlx::query_as::<_, TrackWithAuthor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of a musician's tracks ordered by name.
    pub async fn list_by_musician(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TrackWithAuthor>, sqlx::Error> {
        let query =
            format!("{WITH_AUTHOR} WHERE t.user_id = $1 ORDER BY t.name, t.id LIMIT $2 OFFSET $3");
        sqlx::query_as::<_, TrackWithAuthor>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_musician(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tracks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// A musician's most listened tracks.
    pub async fn popular_by_musician(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<TrackWithAuthor>, sqlx::Error> {
        let query = format!(
            "{WITH_AUTHOR} WHERE t.user_id = $1 ORDER BY t.listen_count DESC, t.id LIMIT $2"
        );
        sqlx::query_as::<_, TrackWithAuthor>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The most listened tracks across all musicians.
    pub async fn popular(pool: &PgPool, limit: i64) -> Result<Vec<TrackWithAuthor>, sqlx::Error> {
        let query = format!("{WITH_AUTHOR} ORDER BY t.listen_count DESC, t.id LIMIT $1");
        sqlx::query_as::<_, TrackWithAuthor>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Tracks whose name starts with `prefix` (case-insensitive).
    pub async fn search(
        pool: &PgPool,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<TrackWithAuthor>, sqlx::Error> {
        let query = format!("{WITH_AUTHOR} WHERE t.name ILIKE $1 ORDER BY t.name, t.id LIMIT $2");
        sqlx::query_as::<_, TrackWithAuthor>(&query)
            .bind(like_prefix(prefix))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// All tracks on an album ordered by name.
    pub async fn list_by_album(
        pool: &PgPool,
        album_id: DbId,
    ) -> Result<Vec<TrackWithAuthor>, sqlx::Error> {
        let query = format!("{WITH_AUTHOR} WHERE t.album_id = $1 ORDER BY t.name, t.id");
        sqlx::query_as::<_, TrackWithAuthor>(&query)
            .bind(album_id)
            .fetch_all(pool)
            .await
    }

    /// All tracks in a playlist ordered by name.
    pub async fn list_by_playlist(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Vec<TrackWithAuthor>, sqlx::Error> {
        let query = format!(
            "{WITH_AUTHOR} JOIN playlist_tracks pt ON pt.track_id = t.id \
             WHERE pt.playlist_id = $1 ORDER BY t.name, t.id"
        );
        sqlx::query_as::<_, TrackWithAuthor>(&query)
            .bind(playlist_id)
            .fetch_all(pool)
            .await
    }

    /// Bump the listen counter. Returns `true` if the track exists.
    pub async fn increment_listen_count(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tracks SET listen_count = listen_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach a track to an album.
    pub async fn set_album(
        pool: &PgPool,
        id: DbId,
        album_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tracks SET album_id = $2 WHERE id = $1")
            .bind(id)
            .bind(album_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a track. Playlist links and recency entries cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
