//! Handlers for the `/tracks` resource.

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use cadence_core::access::{check_listen_access, refusal, ListenGrant};
use cadence_core::audio;
use cadence_core::error::CoreError;
use cadence_core::file_store::extension_of;
use cadence_core::pagination::{DEFAULT_POPULAR_LIMIT, DEFAULT_SEARCH_LIMIT};
use cadence_core::recency::EntityKind;
use cadence_core::types::DbId;
use cadence_db::models::subscription::LatestPurchase;
use cadence_db::models::track::{CreateTrack, TrackWithAuthor};
use cadence_db::repositories::{TrackRepo, TransactionRepo, UserRepo};
use chrono::Utc;
use serde::Deserialize;

use super::{read_upload, require_title};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireMusician;
use crate::query::{LimitParams, SearchParams};
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::views::{find_track_view, track_views, TrackResolver, TrackView};

/// The only accepted upload format.
const TRACK_EXTENSION: &str = "mp3";

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Query parameters for `GET /tracks/{id}/listen`.
#[derive(Debug, Deserialize)]
pub struct ListenParams {
    /// Byte offset to start streaming from.
    #[serde(default)]
    pub position: u64,
}

/// POST /api/v1/tracks
///
/// Multipart form with a `name` text field and an `.mp3` `file` field.
/// Musicians only.
pub async fn upload(
    State(state): State<AppState>,
    RequireMusician(user): RequireMusician,
    multipart: Multipart,
) -> AppResult<Created<TrackView>> {
    let mut upload = read_upload(multipart).await?;
    let name = require_title(
        upload.fields.get("name").map(String::as_str).unwrap_or(""),
        "Track",
    )?;
    let (file_name, data) = upload.require_file()?;

    if extension_of(&file_name).as_deref() != Some(TRACK_EXTENSION) {
        return Err(AppError::BadRequest(format!(
            "Unsupported audio format for '{file_name}'. Supported: .mp3"
        )));
    }

    let audio_bytes = data.clone();
    let total_seconds = tokio::task::spawn_blocking(move || audio::duration_seconds(audio_bytes))
        .await
        .map_err(|e| AppError::InternalError(format!("Duration task failed: {e}")))?
        .map_err(|e| AppError::BadRequest(format!("Not a readable MP3 file: {e}")))?;

    let file_path = state
        .file_store
        .write(&data, user.user_id, &state.config.tracks_dir, &file_name)
        .await?;

    let track = TrackRepo::create(
        &state.pool,
        &CreateTrack {
            user_id: user.user_id,
            name,
            file_path,
        },
    )
    .await?;
    let author = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_default();

    tracing::info!(
        track_id = track.id,
        user_id = user.user_id,
        total_seconds,
        "Track uploaded"
    );

    let view = TrackView {
        id: track.id,
        musician_id: track.user_id,
        name: track.name,
        author_name: author,
        total_seconds,
    };
    Ok(created(view))
}

/// GET /api/v1/tracks/{id}
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TrackView>>> {
    let view = find_track_view(&state, id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/tracks/popular?limit=
pub async fn popular(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<TrackView>>>> {
    let tracks = TrackRepo::popular(&state.pool, params.limit_or(DEFAULT_POPULAR_LIMIT)).await?;
    let views = track_views(&state.file_store, tracks).await?;
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/tracks/search?q=&limit=
pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<TrackView>>>> {
    let limit = LimitParams {
        limit: params.limit,
    }
    .limit_or(DEFAULT_SEARCH_LIMIT);
    let tracks = TrackRepo::search(&state.pool, params.q.trim(), limit).await?;
    let views = track_views(&state.file_store, tracks).await?;
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/tracks/last-listened
pub async fn last_listened(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<TrackView>>>> {
    let views = state
        .recency
        .resolve(user.user_id, &TrackResolver(&state))
        .await?;
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/tracks/{id}/listen?position=
///
/// Stream a track from a byte offset. The caller needs an active
/// subscription or a free track; without a subscription one free track is
/// spent. A served listen bumps the listen counter and lands in the
/// caller's recently listened tracks.
pub async fn listen(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<ListenParams>,
) -> AppResult<Response> {
    // 1. Resolve the track and its audio before spending anything.
    let track = find_track(&state, id).await?;
    let bytes = state.file_store.read(&track.file_path).await?;

    let start = usize::try_from(params.position)
        .ok()
        .filter(|p| *p <= bytes.len())
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Position {} is beyond the end of the track ({} bytes)",
                params.position,
                bytes.len()
            ))
        })?;

    // 2. Access gate.
    let grant = authorize_listen(&state, user.user_id).await?;

    // 3. Bookkeeping.
    TrackRepo::increment_listen_count(&state.pool, id).await?;
    state
        .recency
        .record(user.user_id, EntityKind::Track, id, Utc::now())
        .await?;

    tracing::info!(
        user_id = user.user_id,
        track_id = id,
        grant = ?grant,
        position = start,
        "Serving track"
    );

    let body = bytes[start..].to_vec();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, body.len().to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .body(Body::from(body))
        .map_err(|e| AppError::InternalError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_track(state: &AppState, id: DbId) -> AppResult<TrackWithAuthor> {
    TrackRepo::find_with_author(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: EntityKind::Track.label(),
            id,
        }))
}

/// Decide whether `user_id` may listen now and spend a free track if needed.
///
/// The decrement is a conditional update, so two concurrent listens on the
/// last free track cannot both succeed.
async fn authorize_listen(state: &AppState, user_id: DbId) -> AppResult<ListenGrant> {
    let latest = TransactionRepo::latest_for_user(&state.pool, user_id).await?;
    let latest_expiry = latest.as_ref().map(LatestPurchase::expires_at);

    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    let grant = check_listen_access(latest_expiry, user.free_tracks, Utc::now())?;
    if grant == ListenGrant::FreeTrack {
        let remaining = UserRepo::consume_free_track(&state.pool, user_id)
            .await?
            .ok_or_else(|| refusal(latest_expiry))?;
        tracing::debug!(user_id, remaining, "Spent a free track");
    }
    Ok(grant)
}
