//! Route definitions for the `/subscriptions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::subscriptions;
use crate::state::AppState;

/// Routes mounted at `/subscriptions`.
///
/// ```text
/// GET  /              -> list
/// GET  /current       -> current
/// POST /{id}/buy      -> buy
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(subscriptions::list))
        .route("/current", get(subscriptions::current))
        .route("/{id}/buy", post(subscriptions::buy))
}
