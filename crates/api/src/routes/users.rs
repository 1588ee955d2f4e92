//! Route definitions for the `/users` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST /register         -> register (public)
/// POST /login            -> login (public)
/// GET  /me               -> get_me
/// PUT  /me               -> update_me
/// POST /me/password      -> change_password
/// GET  /me/avatar        -> get_my_avatar
/// POST /me/avatar        -> upload_avatar (multipart, up to `upload_limit` bytes)
/// GET  /{id}/avatar      -> get_avatar
/// ```
pub fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/me", get(users::get_me).put(users::update_me))
        .route("/me/password", post(users::change_password))
        .route(
            "/me/avatar",
            get(users::get_my_avatar)
                .post(users::upload_avatar)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/{id}/avatar", get(users::get_avatar))
}
