//! Bounded "last listened" lists.
//!
//! For every `(user, kind)` pair the service remembers at most
//! [`MAX_RECENT_ENTRIES`] entities the user consumed most recently. Entries are
//! deduplicated by entity: consuming something that is already on the list is
//! a no-op and does not move it to the front. When a new entity arrives and
//! the list is full, the entry with the oldest `listened_at` is evicted.
//!
//! The eviction decision is the pure function [`plan_record`]. [`RecencyTracker`]
//! applies it through a [`RecencyStore`], which the database crate implements
//! once for all three entity kinds.

use std::fmt;
use std::future::Future;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::locks::KeyedLocks;
use crate::types::{DbId, Timestamp, UNSET_TIMESTAMP};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of entries kept per user and entity kind.
pub const MAX_RECENT_ENTRIES: usize = 3;

// ---------------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------------

/// The kinds of entity a listen can be recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Track,
    Album,
    Playlist,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Track, Self::Album, Self::Playlist];

    /// Lowercase wire/database name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Playlist => "playlist",
        }
    }

    /// Entity label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Track => "Track",
            Self::Album => "Album",
            Self::Playlist => "Playlist",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "track" => Ok(Self::Track),
            "album" => Ok(Self::Album),
            "playlist" => Ok(Self::Playlist),
            other => Err(CoreError::Validation(format!(
                "Unknown entity kind '{other}'. Must be one of: track, album, playlist"
            ))),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A stored recency entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecencyEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub entity_id: DbId,
    pub kind: EntityKind,
    pub listened_at: Timestamp,
}

/// An entry about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecencyEntry {
    pub user_id: DbId,
    pub entity_id: DbId,
    pub kind: EntityKind,
    pub listened_at: Timestamp,
}

/// Reject the default (epoch) timestamp and timestamps later than `now`.
pub fn validate_listen_time(listened_at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if listened_at == UNSET_TIMESTAMP {
        return Err(CoreError::InvalidTimestamp(
            "listen time cannot be the default value".into(),
        ));
    }
    if listened_at > now {
        return Err(CoreError::InvalidTimestamp(format!(
            "listen time {listened_at} is later than now ({now})"
        )));
    }
    Ok(())
}

/// What recording a listen does (or did) to a recency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The entity is already on the list; nothing changes.
    AlreadyPresent,
    /// The list had room; the entry is appended.
    Inserted,
    /// The list was full; `evicted` (an entry id) is removed first.
    InsertedWithEviction { evicted: DbId },
}

/// Decide how to record `entity_id` against the current `existing` list.
///
/// `existing` may be in any order. Ties on `listened_at` evict the lower id.
pub fn plan_record(existing: &[RecencyEntry], entity_id: DbId) -> RecordOutcome {
    if existing.iter().any(|e| e.entity_id == entity_id) {
        return RecordOutcome::AlreadyPresent;
    }
    if existing.len() < MAX_RECENT_ENTRIES {
        return RecordOutcome::Inserted;
    }
    match existing.iter().min_by_key(|e| (e.listened_at, e.id)) {
        Some(oldest) => RecordOutcome::InsertedWithEviction { evicted: oldest.id },
        None => RecordOutcome::Inserted,
    }
}

/// Sort entries newest first. Ties keep the most recently inserted row first.
pub fn sort_newest_first(entries: &mut [RecencyEntry]) {
    entries.sort_by(|a, b| {
        b.listened_at
            .cmp(&a.listened_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// Persistence for recency entries, shared by all entity kinds.
pub trait RecencyStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All entries for `(user_id, kind)`, newest first.
    fn list(
        &self,
        user_id: DbId,
        kind: EntityKind,
    ) -> impl Future<Output = Result<Vec<RecencyEntry>, Self::Error>> + Send;

    /// Remove one entry by id.
    fn delete(
        &self,
        kind: EntityKind,
        entry_id: DbId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Insert an entry, returning the stored row.
    fn insert(
        &self,
        entry: &NewRecencyEntry,
    ) -> impl Future<Output = Result<RecencyEntry, Self::Error>> + Send;
}

/// Looks up the full entity behind a recency entry for one kind.
pub trait EntityResolver: Send + Sync {
    const KIND: EntityKind;
    type Entity: Send;
    type Error: Send;

    /// Resolve `entity_id`, or `None` when it no longer exists.
    fn resolve(
        &self,
        entity_id: DbId,
    ) -> impl Future<Output = Result<Option<Self::Entity>, Self::Error>> + Send;
}

/// What to do when a recency entry no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Drop the entry from the response and log a warning.
    #[default]
    Skip,
    /// Fail the whole read with [`CoreError::StaleReference`].
    Fail,
}

impl StalePolicy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Fail => "fail",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(CoreError::Validation(format!(
                "Unknown stale policy '{other}'. Must be one of: skip, fail"
            ))),
        }
    }
}

/// Failure while recording or reading a recency list.
#[derive(Debug, thiserror::Error)]
pub enum RecencyError<E> {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Recency store error: {0}")]
    Store(#[source] E),
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Records listens and reads recency lists for every entity kind.
///
/// Calls for the same `(user, kind)` are serialized inside this process so the
/// read-evict-insert sequence cannot interleave. Separate processes sharing a
/// database can still race and briefly exceed the bound.
pub struct RecencyTracker<S> {
    store: S,
    locks: KeyedLocks<(DbId, EntityKind)>,
    stale_policy: StalePolicy,
}

impl<S: RecencyStore> RecencyTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            stale_policy: StalePolicy::default(),
        }
    }

    pub fn with_stale_policy(mut self, stale_policy: StalePolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_policy
    }

    /// Record that `user_id` consumed `entity_id` of `kind` at `listened_at`.
    pub async fn record(
        &self,
        user_id: DbId,
        kind: EntityKind,
        entity_id: DbId,
        listened_at: Timestamp,
    ) -> Result<RecordOutcome, RecencyError<S::Error>> {
        validate_listen_time(listened_at, Utc::now())?;

        let _guard = self.locks.lock((user_id, kind)).await;

        let existing = self
            .store
            .list(user_id, kind)
            .await
            .map_err(RecencyError::Store)?;
        let outcome = plan_record(&existing, entity_id);

        match outcome {
            RecordOutcome::AlreadyPresent => {
                tracing::debug!(user_id, entity_id, %kind, "Recency: already present, skipping");
                return Ok(outcome);
            }
            RecordOutcome::InsertedWithEviction { evicted } => {
                self.store
                    .delete(kind, evicted)
                    .await
                    .map_err(RecencyError::Store)?;
                tracing::debug!(user_id, evicted, %kind, "Recency: evicted oldest entry");
            }
            RecordOutcome::Inserted => {}
        }

        let entry = NewRecencyEntry {
            user_id,
            entity_id,
            kind,
            listened_at,
        };
        self.store
            .insert(&entry)
            .await
            .map_err(RecencyError::Store)?;

        Ok(outcome)
    }

    /// The raw list for `(user_id, kind)`, newest first.
    pub async fn entries(
        &self,
        user_id: DbId,
        kind: EntityKind,
    ) -> Result<Vec<RecencyEntry>, RecencyError<S::Error>> {
        let mut entries = self
            .store
            .list(user_id, kind)
            .await
            .map_err(RecencyError::Store)?;
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// The list for `(user_id, R::KIND)` resolved to full entities, newest first.
    ///
    /// Entries the resolver cannot find are handled per [`StalePolicy`].
    pub async fn resolve<R>(&self, user_id: DbId, resolver: &R) -> Result<Vec<R::Entity>, R::Error>
    where
        R: EntityResolver,
        R::Error: From<RecencyError<S::Error>>,
    {
        let entries = self.entries(user_id, R::KIND).await?;

        let mut resolved = Vec::with_capacity(entries.len());
        for entry in entries {
            match resolver.resolve(entry.entity_id).await? {
                Some(entity) => resolved.push(entity),
                None => match self.stale_policy {
                    StalePolicy::Skip => {
                        tracing::warn!(
                            user_id,
                            entity_id = entry.entity_id,
                            kind = %R::KIND,
                            "Recency: skipping stale entry"
                        );
                    }
                    StalePolicy::Fail => {
                        let err = CoreError::StaleReference {
                            entity: R::KIND.label(),
                            id: entry.entity_id,
                        };
                        return Err(RecencyError::Core(err).into());
                    }
                },
            }
        }
        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
