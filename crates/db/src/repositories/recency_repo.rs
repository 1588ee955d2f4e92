//! Repository for the `last_listened_tracks`, `last_listened_albums` and
//! `last_listened_playlists` tables.
//!
//! The three tables share a shape and differ only in the name of the entity
//! column, so every query is built once from [`table_for`].

use cadence_core::recency::{EntityKind, NewRecencyEntry, RecencyEntry, RecencyStore};
use cadence_core::types::DbId;
use sqlx::PgPool;

use crate::models::recency::RecencyRow;

/// Table and entity column backing each kind.
pub fn table_for(kind: EntityKind) -> (&'static str, &'static str) {
    match kind {
        EntityKind::Track => ("last_listened_tracks", "track_id"),
        EntityKind::Album => ("last_listened_albums", "album_id"),
        EntityKind::Playlist => ("last_listened_playlists", "playlist_id"),
    }
}

/// Provides raw access to the recency tables.
pub struct RecencyRepo;

impl RecencyRepo {
    /// All entries for `(user_id, kind)`, newest first.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        kind: EntityKind,
    ) -> Result<Vec<RecencyEntry>, sqlx::Error> {
        let (table, column) = table_for(kind);
        let query = format!(
            "SELECT id, user_id, {column} AS entity_id, listened_at FROM {table} \
             WHERE user_id = $1 \
             ORDER BY listened_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, RecencyRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.into_entry(kind)).collect())
    }

    /// Delete one entry by id. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, kind: EntityKind, id: DbId) -> Result<bool, sqlx::Error> {
        let (table, _) = table_for(kind);
        let query = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert an entry, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        entry: &NewRecencyEntry,
    ) -> Result<RecencyEntry, sqlx::Error> {
        let (table, column) = table_for(entry.kind);
        let query = format!(
            "INSERT INTO {table} (user_id, {column}, listened_at) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, {column} AS entity_id, listened_at"
        );
        let row = sqlx::query_as::<_, RecencyRow>(&query)
            .bind(entry.user_id)
            .bind(entry.entity_id)
            .bind(entry.listened_at)
            .fetch_one(pool)
            .await?;
        Ok(row.into_entry(entry.kind))
    }
}

/// [`RecencyStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgRecencyStore {
    pool: PgPool,
}

impl PgRecencyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RecencyStore for PgRecencyStore {
    type Error = sqlx::Error;

    async fn list(&self, user_id: DbId, kind: EntityKind) -> Result<Vec<RecencyEntry>, sqlx::Error> {
        RecencyRepo::list(&self.pool, user_id, kind).await
    }

    async fn delete(&self, kind: EntityKind, entry_id: DbId) -> Result<(), sqlx::Error> {
        RecencyRepo::delete(&self.pool, kind, entry_id).await?;
        Ok(())
    }

    async fn insert(&self, entry: &NewRecencyEntry) -> Result<RecencyEntry, sqlx::Error> {
        RecencyRepo::insert(&self.pool, entry).await
    }
}
