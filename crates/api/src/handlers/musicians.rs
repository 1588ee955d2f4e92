//! Handlers for the `/musicians` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use cadence_core::error::CoreError;
use cadence_core::pagination::{
    Page, PageRequest, DEFAULT_MUSICIANS_PAGE_SIZE, DEFAULT_MUSICIAN_CATALOG_PAGE_SIZE,
    DEFAULT_POPULAR_BY_MUSICIAN_LIMIT,
};
use cadence_core::types::DbId;
use cadence_db::models::user::MusicianSummary;
use cadence_db::repositories::{AlbumRepo, TrackRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{LimitParams, PageParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::{album_views, track_views, AlbumView, TrackView};

/// GET /api/v1/musicians
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<MusicianSummary>>>> {
    let request = params.request(DEFAULT_MUSICIANS_PAGE_SIZE);
    let items = UserRepo::list_musicians(&state.pool, request.limit(), request.offset()).await?;
    let total = UserRepo::count_musicians(&state.pool).await?;
    Ok(Json(DataResponse {
        data: Page::new(items, request, total),
    }))
}

/// GET /api/v1/musicians/search?q=
///
/// Case-insensitive name prefix match.
pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Page<MusicianSummary>>>> {
    let request = PageRequest::new(params.page, params.page_size, DEFAULT_MUSICIANS_PAGE_SIZE);
    let prefix = params.q.trim();
    let items =
        UserRepo::search_musicians(&state.pool, prefix, request.limit(), request.offset()).await?;
    let total = UserRepo::count_search_musicians(&state.pool, prefix).await?;
    Ok(Json(DataResponse {
        data: Page::new(items, request, total),
    }))
}

/// GET /api/v1/musicians/{id}
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MusicianSummary>>> {
    let musician = find_musician(&state, id).await?;
    Ok(Json(DataResponse { data: musician }))
}

/// GET /api/v1/musicians/{id}/tracks
pub async fn tracks(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<TrackView>>>> {
    find_musician(&state, id).await?;

    let request = params.request(DEFAULT_MUSICIAN_CATALOG_PAGE_SIZE);
    let tracks =
        TrackRepo::list_by_musician(&state.pool, id, request.limit(), request.offset()).await?;
    let total = TrackRepo::count_by_musician(&state.pool, id).await?;
    let views = track_views(&state.file_store, tracks).await?;
    Ok(Json(DataResponse {
        data: Page::new(views, request, total),
    }))
}

/// GET /api/v1/musicians/{id}/albums
pub async fn albums(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<AlbumView>>>> {
    find_musician(&state, id).await?;

    let request = params.request(DEFAULT_MUSICIAN_CATALOG_PAGE_SIZE);
    let albums =
        AlbumRepo::list_by_musician(&state.pool, id, request.limit(), request.offset()).await?;
    let total = AlbumRepo::count_by_musician(&state.pool, id).await?;
    let views = album_views(&state, albums).await?;
    Ok(Json(DataResponse {
        data: Page::new(views, request, total),
    }))
}

/// GET /api/v1/musicians/{id}/tracks/popular?limit=
pub async fn popular_tracks(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<TrackView>>>> {
    let limit = params.limit_or(DEFAULT_POPULAR_BY_MUSICIAN_LIMIT);
    let tracks = TrackRepo::popular_by_musician(&state.pool, id, limit).await?;
    let views = track_views(&state.file_store, tracks).await?;
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/musicians/{id}/albums/popular?limit=
///
/// Albums ranked by the summed listens of their tracks.
pub async fn popular_albums(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<AlbumView>>>> {
    let limit = params.limit_or(DEFAULT_POPULAR_BY_MUSICIAN_LIMIT);
    let albums = AlbumRepo::popular_by_musician(&state.pool, id, limit).await?;
    let views = album_views(&state, albums).await?;
    Ok(Json(DataResponse { data: views }))
}

async fn find_musician(state: &AppState, id: DbId) -> AppResult<MusicianSummary> {
    UserRepo::find_musician(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Musician",
            id,
        }))
}
