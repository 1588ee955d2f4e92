//! Route definitions for the `/musicians` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::musicians;
use crate::state::AppState;

/// Routes mounted at `/musicians`.
///
/// ```text
/// GET /                        -> list (?page, page_size)
/// GET /search                  -> search (?q, page, page_size)
/// GET /{id}                    -> get
/// GET /{id}/tracks             -> tracks (?page, page_size)
/// GET /{id}/tracks/popular     -> popular_tracks (?limit)
/// GET /{id}/albums             -> albums (?page, page_size)
/// GET /{id}/albums/popular     -> popular_albums (?limit)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(musicians::list))
        .route("/search", get(musicians::search))
        .route("/{id}", get(musicians::get))
        .route("/{id}/tracks", get(musicians::tracks))
        .route("/{id}/tracks/popular", get(musicians::popular_tracks))
        .route("/{id}/albums", get(musicians::albums))
        .route("/{id}/albums/popular", get(musicians::popular_albums))
}
