//! Row shape shared by the three `last_listened_*` tables.

use cadence_core::recency::{EntityKind, RecencyEntry};
use cadence_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A `last_listened_*` row with the kind-specific column aliased to `entity_id`.
#[derive(Debug, Clone, FromRow)]
pub struct RecencyRow {
    pub id: DbId,
    pub user_id: DbId,
    pub entity_id: DbId,
    pub listened_at: Timestamp,
}

impl RecencyRow {
    pub fn into_entry(self, kind: EntityKind) -> RecencyEntry {
        RecencyEntry {
            id: self.id,
            user_id: self.user_id,
            entity_id: self.entity_id,
            kind,
            listened_at: self.listened_at,
        }
    }
}
