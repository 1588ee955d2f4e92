//! Display views for tracks, albums and playlists.
//!
//! Every view that lists tracks reads each audio file to report its
//! duration. The resolvers at the bottom plug these views into the recency
//! tracker so "last listened" reads return the same shapes as every other
//! listing.

use cadence_core::audio;
use cadence_core::error::CoreError;
use cadence_core::file_store::LocalFileStore;
use cadence_core::recency::{EntityKind, EntityResolver};
use cadence_core::types::DbId;
use cadence_db::models::album::AlbumWithAuthor;
use cadence_db::models::playlist::Playlist;
use cadence_db::models::track::TrackWithAuthor;
use cadence_db::repositories::{AlbumRepo, PlaylistRepo, TrackRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TrackView {
    pub id: DbId,
    pub musician_id: DbId,
    pub name: String,
    pub author_name: String,
    pub total_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumView {
    pub id: DbId,
    pub musician_id: DbId,
    pub name: String,
    pub author_name: String,
    /// Sorted by name.
    pub tracks: Vec<TrackView>,
    pub track_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistView {
    pub id: DbId,
    pub name: String,
    /// Sorted by name.
    pub tracks: Vec<TrackView>,
    pub track_count: usize,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Measure the duration of stored audio off the async runtime.
pub async fn measure_duration(bytes: Vec<u8>) -> AppResult<f64> {
    let seconds = tokio::task::spawn_blocking(move || audio::duration_seconds(bytes))
        .await
        .map_err(|e| AppError::InternalError(format!("Duration task failed: {e}")))??;
    Ok(seconds)
}

pub async fn track_view(store: &LocalFileStore, track: TrackWithAuthor) -> AppResult<TrackView> {
    let bytes = store.read(&track.file_path).await?;
    let total_seconds = measure_duration(bytes).await?;
    Ok(TrackView {
        id: track.id,
        musician_id: track.user_id,
        name: track.name,
        author_name: track.author_name,
        total_seconds,
    })
}

pub async fn track_views(
    store: &LocalFileStore,
    tracks: Vec<TrackWithAuthor>,
) -> AppResult<Vec<TrackView>> {
    let mut views = Vec::with_capacity(tracks.len());
    for track in tracks {
        views.push(track_view(store, track).await?);
    }
    Ok(views)
}

pub async fn album_view(state: &AppState, album: AlbumWithAuthor) -> AppResult<AlbumView> {
    let tracks = TrackRepo::list_by_album(&state.pool, album.id).await?;
    let tracks = track_views(&state.file_store, tracks).await?;
    Ok(AlbumView {
        id: album.id,
        musician_id: album.user_id,
        name: album.name,
        author_name: album.author_name,
        track_count: tracks.len(),
        tracks,
    })
}

pub async fn album_views(
    state: &AppState,
    albums: Vec<AlbumWithAuthor>,
) -> AppResult<Vec<AlbumView>> {
    let mut views = Vec::with_capacity(albums.len());
    for album in albums {
        views.push(album_view(state, album).await?);
    }
    Ok(views)
}

pub async fn playlist_view(state: &AppState, playlist: Playlist) -> AppResult<PlaylistView> {
    let tracks = TrackRepo::list_by_playlist(&state.pool, playlist.id).await?;
    let tracks = track_views(&state.file_store, tracks).await?;
    Ok(PlaylistView {
        id: playlist.id,
        name: playlist.name,
        track_count: tracks.len(),
        tracks,
    })
}

/// Load a track for display or fail with 404.
pub async fn find_track_view(state: &AppState, id: DbId) -> AppResult<TrackView> {
    let track = TrackRepo::find_with_author(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: EntityKind::Track.label(),
            id,
        })?;
    track_view(&state.file_store, track).await
}

// ---------------------------------------------------------------------------
// Recency resolvers
// ---------------------------------------------------------------------------

pub struct TrackResolver<'a>(pub &'a AppState);

impl EntityResolver for TrackResolver<'_> {
    const KIND: EntityKind = EntityKind::Track;
    type Entity = TrackView;
    type Error = AppError;

    async fn resolve(&self, entity_id: DbId) -> AppResult<Option<TrackView>> {
        match TrackRepo::find_with_author(&self.0.pool, entity_id).await? {
            Some(track) => Ok(Some(track_view(&self.0.file_store, track).await?)),
            None => Ok(None),
        }
    }
}

pub struct AlbumResolver<'a>(pub &'a AppState);

impl EntityResolver for AlbumResolver<'_> {
    const KIND: EntityKind = EntityKind::Album;
    type Entity = AlbumView;
    type Error = AppError;

    async fn resolve(&self, entity_id: DbId) -> AppResult<Option<AlbumView>> {
        match AlbumRepo::find_with_author(&self.0.pool, entity_id).await? {
            Some(album) => Ok(Some(album_view(self.0, album).await?)),
            None => Ok(None),
        }
    }
}

pub struct PlaylistResolver<'a>(pub &'a AppState);

impl EntityResolver for PlaylistResolver<'_> {
    const KIND: EntityKind = EntityKind::Playlist;
    type Entity = PlaylistView;
    type Error = AppError;

    async fn resolve(&self, entity_id: DbId) -> AppResult<Option<PlaylistView>> {
        match PlaylistRepo::find_by_id(&self.0.pool, entity_id).await? {
            Some(playlist) => Ok(Some(playlist_view(self.0, playlist).await?)),
            None => Ok(None),
        }
    }
}
