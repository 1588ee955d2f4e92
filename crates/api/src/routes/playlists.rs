//! Route definitions for the `/playlists` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::playlists;
use crate::state::AppState;

/// Routes mounted at `/playlists`.
///
/// ```text
/// GET    /                 -> list (?page, page_size)
/// POST   /                 -> create
/// GET    /last-listened    -> last_listened
/// PUT    /{id}             -> update (owner)
/// DELETE /{id}             -> delete (owner)
/// POST   /{id}/tracks      -> add_track (owner)
/// POST   /{id}/opened      -> mark_opened (owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(playlists::list).post(playlists::create))
        .route("/last-listened", get(playlists::last_listened))
        .route("/{id}", put(playlists::update).delete(playlists::delete))
        .route("/{id}/tracks", post(playlists::add_track))
        .route("/{id}/opened", post(playlists::mark_opened))
}
