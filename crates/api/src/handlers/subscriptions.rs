//! Handlers for the `/subscriptions` resource.
//!
//! Purchases stack: buying while a subscription is active schedules the new
//! one to start when the current one ends.

use axum::extract::{Path, State};
use axum::Json;
use cadence_core::access::{is_active, next_purchase_start, subscription_expires_at};
use cadence_core::error::CoreError;
use cadence_core::types::{DbId, Timestamp};
use cadence_db::models::subscription::{LatestPurchase, Subscription};
use cadence_db::repositories::{SubscriptionRepo, TransactionRepo};
use chrono::Utc;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// A purchase as seen by its buyer.
#[derive(Debug, Serialize)]
pub struct SubscriptionPeriod {
    pub subscription_id: DbId,
    pub name: String,
    pub starts_at: Timestamp,
    pub expires_at: Timestamp,
}

/// GET /api/v1/subscriptions
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Subscription>>>> {
    let plans = SubscriptionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// POST /api/v1/subscriptions/{id}/buy
pub async fn buy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Created<SubscriptionPeriod>> {
    let plan = SubscriptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscription",
            id,
        }))?;

    // Read-latest-then-insert; concurrent buys must not share a start.
    let _purchase = state.purchase_locks.lock(user.user_id).await;

    let now = Utc::now();
    let current_expiry = TransactionRepo::latest_for_user(&state.pool, user.user_id)
        .await?
        .map(|latest| latest.expires_at());
    let starts_at = next_purchase_start(current_expiry, now);

    TransactionRepo::create(&state.pool, user.user_id, plan.id, starts_at).await?;

    let period = SubscriptionPeriod {
        subscription_id: plan.id,
        name: plan.name,
        starts_at,
        expires_at: subscription_expires_at(starts_at, plan.duration_days),
    };
    tracing::info!(
        user_id = user.user_id,
        subscription_id = plan.id,
        starts_at = %period.starts_at,
        expires_at = %period.expires_at,
        "Subscription purchased"
    );
    Ok(created(period))
}

/// GET /api/v1/subscriptions/current
///
/// The caller's coverage, ending at the expiry of the latest purchase.
/// 404 when nothing is active.
pub async fn current(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<SubscriptionPeriod>>> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Active subscription for user",
            id: user.user_id,
        })
    };

    let latest: LatestPurchase = TransactionRepo::latest_for_user(&state.pool, user.user_id)
        .await?
        .ok_or_else(not_found)?;
    let expires_at = latest.expires_at();
    if !is_active(expires_at, Utc::now()) {
        return Err(not_found());
    }

    Ok(Json(DataResponse {
        data: SubscriptionPeriod {
            subscription_id: latest.subscription_id,
            name: latest.name,
            starts_at: latest.purchased_at,
            expires_at,
        },
    }))
}
