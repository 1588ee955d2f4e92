pub mod albums;
pub mod health;
pub mod musicians;
pub mod playlists;
pub mod subscriptions;
pub mod tracks;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree. Upload routes accept bodies up to
/// `upload_limit` bytes; everything else keeps axum's default limit.
///
/// Route hierarchy:
///
/// ```text
/// /ping                                 token check (requires auth)
///
/// /users/register                       register (public)
/// /users/login                          login (public)
/// /users/me                             profile get, update
/// /users/me/password                    change password
/// /users/me/avatar                      avatar get, upload
/// /users/{id}/avatar                    another user's avatar
///
/// /musicians                            paginated list
/// /musicians/search                     name prefix search
/// /musicians/{id}                       get
/// /musicians/{id}/tracks[/popular]      catalog tracks, most listened
/// /musicians/{id}/albums[/popular]      catalog albums, most listened
///
/// /tracks                               upload (musician)
/// /tracks/popular                       most listened overall
/// /tracks/search                        name prefix search
/// /tracks/last-listened                 recently listened tracks
/// /tracks/{id}                          get
/// /tracks/{id}/listen                   stream (access gated)
///
/// /albums                               create (musician)
/// /albums/last-listened                 recently opened albums
/// /albums/{id}                          get
/// /albums/{id}/tracks                   add own track (musician)
/// /albums/{id}/opened                   record an album open
///
/// /playlists                            list own, create
/// /playlists/last-listened              recently opened playlists
/// /playlists/{id}                       update, delete
/// /playlists/{id}/tracks                add track
/// /playlists/{id}/opened                record a playlist open
///
/// /subscriptions                        plans
/// /subscriptions/current                active coverage
/// /subscriptions/{id}/buy               purchase
/// ```
pub fn api_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/ping", get(handlers::ping::ping))
        .nest("/users", users::router(upload_limit))
        .nest("/musicians", musicians::router())
        .nest("/tracks", tracks::router(upload_limit))
        .nest("/albums", albums::router())
        .nest("/playlists", playlists::router())
        .nest("/subscriptions", subscriptions::router())
}
