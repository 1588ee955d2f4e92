//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok`, or `degraded` when PostgreSQL is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Files the store is reading or writing right now.
    pub files_in_use: usize,
    /// `skip` or `fail`; how "last listened" reads treat vanished entities.
    pub recency_stale_policy: &'static str,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = match cadence_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthReport {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        files_in_use: state.file_store.files_in_use(),
        recency_stale_policy: state.recency.stale_policy().name(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
