//! Route definitions for the `/tracks` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tracks;
use crate::state::AppState;

/// Routes mounted at `/tracks`.
///
/// ```text
/// POST /                 -> upload (musician, multipart, up to `upload_limit` bytes)
/// GET  /popular          -> popular (?limit)
/// GET  /search           -> search (?q, limit)
/// GET  /last-listened    -> last_listened
/// GET  /{id}             -> get
/// GET  /{id}/listen      -> listen (?position)
/// ```
pub fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(tracks::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/popular", get(tracks::popular))
        .route("/search", get(tracks::search))
        .route("/last-listened", get(tracks::last_listened))
        .route("/{id}", get(tracks::get))
        .route("/{id}/listen", get(tracks::listen))
}
