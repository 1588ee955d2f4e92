//! Handlers for the `/albums` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cadence_core::error::CoreError;
use cadence_core::recency::EntityKind;
use cadence_core::types::DbId;
use cadence_db::models::album::{AlbumWithAuthor, CreateAlbum};
use cadence_db::repositories::{AlbumRepo, TrackRepo};
use chrono::Utc;
use serde::Deserialize;

use super::require_title;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireMusician;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::views::{album_view, AlbumResolver, AlbumView};

/// Request body for `POST /albums/{id}/tracks` and `POST /playlists/{id}/tracks`.
#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: DbId,
}

/// POST /api/v1/albums
pub async fn create(
    State(state): State<AppState>,
    RequireMusician(user): RequireMusician,
    Json(input): Json<CreateAlbum>,
) -> AppResult<Created<AlbumView>> {
    let name = require_title(&input.name, "Album")?;
    let album = AlbumRepo::create(&state.pool, user.user_id, &name).await?;
    tracing::info!(album_id = album.id, user_id = user.user_id, "Album created");

    let view = album_view(&state, find_album(&state, album.id).await?).await?;
    Ok(created(view))
}

/// GET /api/v1/albums/{id}
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AlbumView>>> {
    let view = album_view(&state, find_album(&state, id).await?).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/albums/{id}/tracks
///
/// Move one of the caller's tracks onto one of the caller's albums.
pub async fn add_track(
    State(state): State<AppState>,
    RequireMusician(user): RequireMusician,
    Path(id): Path<DbId>,
    Json(input): Json<AddTrackRequest>,
) -> AppResult<StatusCode> {
    let album = find_album(&state, id).await?;
    if album.user_id != user.user_id {
        return Err(CoreError::Forbidden("Album belongs to another musician".into()).into());
    }

    let track = TrackRepo::find_by_id(&state.pool, input.track_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: EntityKind::Track.label(),
            id: input.track_id,
        })?;
    if track.user_id != user.user_id {
        return Err(CoreError::Forbidden("Track belongs to another musician".into()).into());
    }

    TrackRepo::set_album(&state.pool, track.id, album.id).await?;
    tracing::info!(album_id = id, track_id = track.id, "Track added to album");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/albums/last-listened
pub async fn last_listened(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<AlbumView>>>> {
    let views = state
        .recency
        .resolve(user.user_id, &AlbumResolver(&state))
        .await?;
    Ok(Json(DataResponse { data: views }))
}

/// POST /api/v1/albums/{id}/opened
///
/// Record that the caller opened an album.
pub async fn mark_opened(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_album(&state, id).await?;
    state
        .recency
        .record(user.user_id, EntityKind::Album, id, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_album(state: &AppState, id: DbId) -> AppResult<AlbumWithAuthor> {
    AlbumRepo::find_with_author(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: EntityKind::Album.label(),
            id,
        }))
}
