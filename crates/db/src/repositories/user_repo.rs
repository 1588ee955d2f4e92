//! Repository for the `users` table.

use cadence_core::roles::ROLE_MUSICIAN;
use cadence_core::types::DbId;
use sqlx::PgPool;

use super::like_prefix;
use crate::models::user::{CreateUser, MusicianSummary, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, role, status, birthday, avatar_path, \
                       free_tracks, created_at, updated_at";

/// Musician rows with catalog counts and listening totals.
const MUSICIAN_SELECT: &str = "\
    SELECT u.id, u.name, \
        (SELECT COUNT(*) FROM tracks t WHERE t.user_id = u.id) AS track_count, \
        (SELECT COUNT(*) FROM albums a WHERE a.user_id = u.id) AS album_count, \
        (SELECT COALESCE(SUM(t.listen_count), 0)::BIGINT FROM tracks t WHERE t.user_id = u.id) \
            AS total_listens \
    FROM users u";

/// Provides CRUD and query operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role, status, birthday)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.status)
            .bind(input.birthday)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Replace a user's name and email. Returns `None` if no row matched.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET name = $2, email = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Store a new password hash. Returns `true` if the row was updated.
    pub async fn update_password_hash(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Point the user's avatar at a stored file path.
    pub async fn set_avatar_path(
        pool: &PgPool,
        id: DbId,
        avatar_path: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET avatar_path = $2 WHERE id = $1")
            .bind(id)
            .bind(avatar_path)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Spend one free track.
    ///
    /// Decrements only while the balance is positive, so concurrent listens
    /// can never drive it below zero. Returns the remaining balance, or `None`
    /// when nothing was left to spend.
    pub async fn consume_free_track(pool: &PgPool, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE users SET free_tracks = free_tracks - 1
             WHERE id = $1 AND free_tracks > 0
             RETURNING free_tracks",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(remaining,)| remaining))
    }

    /// Set every user's free-track balance to `amount`. Returns the number of rows touched.
    pub async fn reset_free_tracks(pool: &PgPool, amount: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET free_tracks = $1")
            .bind(amount)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete a user. Dependent rows cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Musicians
    // -----------------------------------------------------------------------

    /// One page of musicians ordered by name.
    pub async fn list_musicians(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MusicianSummary>, sqlx::Error> {
        let query = format!(
            "{MUSICIAN_SELECT} WHERE u.role = $1 ORDER BY u.name, u.id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MusicianSummary>(&query)
            .bind(ROLE_MUSICIAN)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_musicians(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(ROLE_MUSICIAN)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// A single musician with totals. `None` if the id is not a musician.
    pub async fn find_musician(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MusicianSummary>, sqlx::Error> {
        let query = format!("{MUSICIAN_SELECT} WHERE u.role = $1 AND u.id = $2");
        sqlx::query_as::<_, MusicianSummary>(&query)
            .bind(ROLE_MUSICIAN)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Musicians whose name starts with `prefix` (case-insensitive), ordered by name.
    pub async fn search_musicians(
        pool: &PgPool,
        prefix: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MusicianSummary>, sqlx::Error> {
        let query = format!(
            "{MUSICIAN_SELECT} WHERE u.role = $1 AND u.name ILIKE $2 \
             ORDER BY u.name, u.id LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, MusicianSummary>(&query)
            .bind(ROLE_MUSICIAN)
            .bind(like_prefix(prefix))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_search_musicians(pool: &PgPool, prefix: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1 AND name ILIKE $2")
                .bind(ROLE_MUSICIAN)
                .bind(like_prefix(prefix))
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
