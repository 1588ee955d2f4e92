use std::sync::Arc;

use cadence_core::file_store::LocalFileStore;
use cadence_core::locks::KeyedLocks;
use cadence_core::recency::RecencyTracker;
use cadence_core::types::DbId;
use cadence_db::repositories::PgRecencyStore;

use crate::config::ServerConfig;

/// Tracker instance used by the HTTP layer.
pub type Recency = RecencyTracker<PgRecencyStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cadence_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Track audio and avatar storage.
    pub file_store: Arc<LocalFileStore>,
    /// "Last listened" lists for tracks, albums and playlists.
    pub recency: Arc<Recency>,
    /// One subscription purchase per user at a time.
    pub purchase_locks: Arc<KeyedLocks<DbId>>,
}

impl AppState {
    /// Wire up state from a pool and configuration.
    pub fn new(pool: cadence_db::DbPool, config: ServerConfig) -> Self {
        let file_store = Arc::new(LocalFileStore::new(config.storage_root.clone()));
        let recency = Arc::new(
            RecencyTracker::new(PgRecencyStore::new(pool.clone()))
                .with_stale_policy(config.recency_stale_policy),
        );
        Self {
            pool,
            config: Arc::new(config),
            file_store,
            recency,
            purchase_locks: Arc::new(KeyedLocks::new()),
        }
    }
}
