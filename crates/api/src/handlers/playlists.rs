//! Handlers for the `/playlists` resource.
//!
//! Playlists belong to the user who created them; only the owner may change
//! or delete one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cadence_core::error::CoreError;
use cadence_core::pagination::{Page, DEFAULT_PLAYLISTS_PAGE_SIZE};
use cadence_core::recency::EntityKind;
use cadence_core::types::DbId;
use cadence_db::models::playlist::{Playlist, UpdatePlaylist, DEFAULT_PLAYLIST_NAME};
use cadence_db::repositories::{PlaylistRepo, TrackRepo};
use chrono::Utc;

use super::albums::AddTrackRequest;
use super::require_title;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::views::{playlist_view, PlaylistResolver, PlaylistView};

/// GET /api/v1/playlists
///
/// The caller's own playlists, one page at a time.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<PlaylistView>>>> {
    let request = params.request(DEFAULT_PLAYLISTS_PAGE_SIZE);
    let playlists =
        PlaylistRepo::list_by_user(&state.pool, user.user_id, request.limit(), request.offset())
            .await?;
    let total = PlaylistRepo::count_by_user(&state.pool, user.user_id).await?;

    let mut views = Vec::with_capacity(playlists.len());
    for playlist in playlists {
        views.push(playlist_view(&state, playlist).await?);
    }
    Ok(Json(DataResponse {
        data: Page::new(views, request, total),
    }))
}

/// POST /api/v1/playlists
///
/// Create an empty playlist with the default name.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Created<PlaylistView>> {
    let playlist = PlaylistRepo::create(&state.pool, user.user_id, DEFAULT_PLAYLIST_NAME).await?;
    tracing::info!(playlist_id = playlist.id, user_id = user.user_id, "Playlist created");

    let view = PlaylistView {
        id: playlist.id,
        name: playlist.name,
        tracks: Vec::new(),
        track_count: 0,
    };
    Ok(created(view))
}

/// PUT /api/v1/playlists/{id}
///
/// Rename the playlist and drop the tracks listed in `remove_track_ids`.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlaylist>,
) -> AppResult<Json<DataResponse<PlaylistView>>> {
    let name = require_title(&input.name, "Playlist")?;
    find_owned(&state, id, user.user_id).await?;

    let input = UpdatePlaylist { name, ..input };
    let playlist = PlaylistRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: EntityKind::Playlist.label(),
            id,
        })?;

    let view = playlist_view(&state, playlist).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/playlists/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state, id, user.user_id).await?;
    PlaylistRepo::delete(&state.pool, id).await?;
    tracing::info!(playlist_id = id, user_id = user.user_id, "Playlist deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/playlists/{id}/tracks
///
/// Adding a track that is already in the playlist is a no-op.
pub async fn add_track(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddTrackRequest>,
) -> AppResult<StatusCode> {
    find_owned(&state, id, user.user_id).await?;
    TrackRepo::find_by_id(&state.pool, input.track_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: EntityKind::Track.label(),
            id: input.track_id,
        })?;

    let added = PlaylistRepo::add_track(&state.pool, id, input.track_id).await?;
    tracing::debug!(playlist_id = id, track_id = input.track_id, added, "Add track to playlist");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/playlists/last-listened
pub async fn last_listened(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PlaylistView>>>> {
    let views = state
        .recency
        .resolve(user.user_id, &PlaylistResolver(&state))
        .await?;
    Ok(Json(DataResponse { data: views }))
}

/// POST /api/v1/playlists/{id}/opened
pub async fn mark_opened(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state, id, user.user_id).await?;
    state
        .recency
        .record(user.user_id, EntityKind::Playlist, id, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Load a playlist and check that `user_id` owns it.
async fn find_owned(state: &AppState, id: DbId, user_id: DbId) -> AppResult<Playlist> {
    let playlist = PlaylistRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: EntityKind::Playlist.label(),
            id,
        }))?;
    if playlist.user_id != user_id {
        return Err(CoreError::Forbidden("Playlist belongs to another user".into()).into());
    }
    Ok(playlist)
}
