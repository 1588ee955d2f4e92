//! Daily free-track refresh.
//!
//! Sleeps until the next UTC midnight, then restores every user's balance
//! to [`DAILY_FREE_TRACKS`] in one bulk update. Cancellation while waiting
//! skips the pending reset.

use cadence_core::access::{duration_until_next_reset, next_reset_at, DAILY_FREE_TRACKS};
use cadence_db::repositories::UserRepo;
use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the refresh loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        amount = DAILY_FREE_TRACKS,
        next_reset = %next_reset_at(Utc::now()),
        "Free-track refresh job started"
    );

    loop {
        let wait = duration_until_next_reset(Utc::now());

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Free-track refresh job stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                reset_all(&pool).await;
            }
        }
    }
}

/// Restore every balance once, logging the outcome.
///
/// Returns the number of users updated, or `None` if the update failed.
pub async fn reset_all(pool: &PgPool) -> Option<u64> {
    match UserRepo::reset_free_tracks(pool, DAILY_FREE_TRACKS).await {
        Ok(updated) => {
            tracing::info!(updated, amount = DAILY_FREE_TRACKS, "Free tracks refreshed");
            Some(updated)
        }
        Err(e) => {
            tracing::error!(error = %e, "Free-track refresh failed");
            None
        }
    }
}
