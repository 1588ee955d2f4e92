//! Route definitions for the `/albums` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::albums;
use crate::state::AppState;

/// Routes mounted at `/albums`.
///
/// ```text
/// POST /                 -> create (musician)
/// GET  /last-listened    -> last_listened
/// GET  /{id}             -> get
/// POST /{id}/tracks      -> add_track (musician, owner)
/// POST /{id}/opened      -> mark_opened
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(albums::create))
        .route("/last-listened", get(albums::last_listened))
        .route("/{id}", get(albums::get))
        .route("/{id}/tracks", post(albums::add_track))
        .route("/{id}/opened", post(albums::mark_opened))
}
