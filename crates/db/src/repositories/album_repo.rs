//! Repository for the `albums` table.

use cadence_core::types::DbId;
use sqlx::PgPool;

use crate::models::album::{Album, AlbumWithAuthor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, image_path, created_at, updated_at";

/// Albums joined with their musician, aliased for [`AlbumWithAuthor`].
const WITH_AUTHOR: &str = "\
    SELECT a.id, a.user_id, a.name, u.name AS author_name \
    FROM albums a JOIN users u ON u.id = a.user_id";

/// Provides CRUD and listing operations for albums.
pub struct AlbumRepo;

impl AlbumRepo {
    /// Insert a new album owned by `user_id`.
    pub async fn create(pool: &PgPool, user_id: DbId, name: &str) -> Result<Album, sqlx::Error> {
        let query = format!(
            "INSERT INTO albums (user_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Album>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Find an album together with its musician's name.
    pub async fn find_with_author(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AlbumWithAuthor>, sqlx::Error> {
        let query = format!("{WITH_AUTHOR} WHERE a.id = $1");
        sqlx::query_as::<_, AlbumWithAuthor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of a musician's albums ordered by name.
    pub async fn list_by_musician(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlbumWithAuthor>, sqlx::Error> {
        let query =
            format!("{WITH_AUTHOR} WHERE a.user_id = $1 ORDER BY a.name, a.id LIMIT $2 OFFSET $3");
        sqlx::query_as::<_, AlbumWithAuthor>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_musician(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM albums WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// A musician's albums ranked by the summed listens of their tracks.
    pub async fn popular_by_musician(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<AlbumWithAuthor>, sqlx::Error> {
        let query = format!(
            "{WITH_AUTHOR} WHERE a.user_id = $1 \
             ORDER BY (SELECT COALESCE(SUM(t.listen_count), 0) FROM tracks t WHERE t.album_id = a.id) DESC, \
                      a.id \
             LIMIT $2"
        );
        sqlx::query_as::<_, AlbumWithAuthor>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete an album. Its tracks stay and lose their album link.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
