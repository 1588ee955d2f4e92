//! "Last listened" lists for tracks, albums and playlists over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use cadence_core::recency::StalePolicy;
use cadence_db::repositories::{AlbumRepo, PlaylistRepo, TrackRepo};
use common::{body_json, get_auth, send_auth};
use sqlx::PgPool;

fn ids(json: &serde_json::Value) -> Vec<i64> {
    json["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}

async fn listen(app: &common::TestApp, token: &str, track_id: i64) {
    let uri = format!("/api/v1/tracks/{track_id}/listen");
    let response = get_auth(app.router(), &uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn last_listened(app: &common::TestApp, token: &str, kind: &str) -> Vec<i64> {
    let uri = format!("/api/v1/{kind}/last-listened");
    let response = get_auth(app.router(), &uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    ids(&body_json(response).await)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_scenario_keeps_three_newest(pool: PgPool) {
    let listener = common::create_user(&pool, "Listener", "listener").await;
    let musician = common::create_user(&pool, "Band", "musician").await;
    let app = common::build_test_app(pool);
    let token = app.token_for(&listener);

    let t1 = common::create_track(&app, musician.id, "One").await;
    let t2 = common::create_track(&app, musician.id, "Two").await;
    let t3 = common::create_track(&app, musician.id, "Three").await;
    let t4 = common::create_track(&app, musician.id, "Four").await;

    for track in [&t1, &t2, &t3] {
        listen(&app, &token, track.id).await;
    }
    assert_eq!(
        last_listened(&app, &token, "tracks").await,
        vec![t3.id, t2.id, t1.id]
    );

    listen(&app, &token, t4.id).await;
    assert_eq!(
        last_listened(&app, &token, "tracks").await,
        vec![t4.id, t3.id, t2.id]
    );

    // Re-listening to a track already in the list does not move it.
    listen(&app, &token, t2.id).await;
    assert_eq!(
        last_listened(&app, &token, "tracks").await,
        vec![t4.id, t3.id, t2.id]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_views_carry_display_fields(pool: PgPool) {
    let listener = common::create_user(&pool, "Listener", "listener").await;
    let musician = common::create_user(&pool, "Band", "musician").await;
    let app = common::build_test_app(pool);
    let token = app.token_for(&listener);

    let track = common::create_track(&app, musician.id, "Song").await;
    listen(&app, &token, track.id).await;

    let response = get_auth(app.router(), "/api/v1/tracks/last-listened", &token).await;
    let json = body_json(response).await;
    let view = &json["data"][0];
    assert_eq!(view["name"], "Song");
    assert_eq!(view["author_name"], "Band");
    assert_eq!(view["musician_id"], musician.id);
    assert!(view["total_seconds"].as_f64().unwrap() > 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lists_are_per_user(pool: PgPool) {
    let alice = common::create_user(&pool, "Alice", "listener").await;
    let bob = common::create_user(&pool, "Bob", "listener").await;
    let musician = common::create_user(&pool, "Band", "musician").await;
    let app = common::build_test_app(pool);

    let track = common::create_track(&app, musician.id, "Song").await;
    listen(&app, &app.token_for(&alice), track.id).await;

    assert_eq!(
        last_listened(&app, &app.token_for(&alice), "tracks").await,
        vec![track.id]
    );
    assert!(last_listened(&app, &app.token_for(&bob), "tracks")
        .await
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_album_opens(pool: PgPool) {
    let listener = common::create_user(&pool, "Listener", "listener").await;
    let musician = common::create_user(&pool, "Band", "musician").await;
    let app = common::build_test_app(pool.clone());
    let token = app.token_for(&listener);

    let mut albums = Vec::new();
    for name in ["First", "Second", "Third", "Fourth"] {
        albums.push(AlbumRepo::create(&pool, musician.id, name).await.unwrap());
    }
    let track = common::create_track(&app, musician.id, "Opener").await;
    TrackRepo::set_album(&pool, track.id, albums[0].id)
        .await
        .unwrap();

    for album in &albums {
        let uri = format!("/api/v1/albums/{}/opened", album.id);
        let response = send_auth(app.router(), Method::POST, &uri, &token).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    assert_eq!(
        last_listened(&app, &token, "albums").await,
        vec![albums[3].id, albums[2].id, albums[1].id]
    );

    // Opening the first album again evicts the second.
    let uri = format!("/api/v1/albums/{}/opened", albums[0].id);
    send_auth(app.router(), Method::POST, &uri, &token).await;
    let response = get_auth(app.router(), "/api/v1/albums/last-listened", &token).await;
    let json = body_json(response).await;
    assert_eq!(
        ids(&json),
        vec![albums[0].id, albums[3].id, albums[2].id]
    );
    assert_eq!(json["data"][0]["track_count"], 1);
    assert_eq!(json["data"][0]["tracks"][0]["name"], "Opener");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_opening_missing_album_is_not_found(pool: PgPool) {
    let listener = common::create_user(&pool, "Listener", "listener").await;
    let app = common::build_test_app(pool);

    let response = send_auth(
        app.router(),
        Method::POST,
        "/api/v1/albums/999999/opened",
        &app.token_for(&listener),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(last_listened(&app, &app.token_for(&listener), "albums")
        .await
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_playlist_opens_and_deletion(pool: PgPool) {
    let listener = common::create_user(&pool, "Listener", "listener").await;
    let app = common::build_test_app(pool.clone());
    let token = app.token_for(&listener);

    let a = PlaylistRepo::create(&pool, listener.id, "Morning").await.unwrap();
    let b = PlaylistRepo::create(&pool, listener.id, "Evening").await.unwrap();

    for playlist in [&a, &b] {
        let uri = format!("/api/v1/playlists/{}/opened", playlist.id);
        let response = send_auth(app.router(), Method::POST, &uri, &token).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
    assert_eq!(last_listened(&app, &token, "playlists").await, vec![b.id, a.id]);

    // Deleting a playlist removes it from the list.
    let uri = format!("/api/v1/playlists/{}", b.id);
    let response = send_auth(app.router(), Method::DELETE, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(last_listened(&app, &token, "playlists").await, vec![a.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_audio_surfaces_as_not_found(pool: PgPool) {
    let listener = common::create_user(&pool, "Listener", "listener").await;
    let musician = common::create_user(&pool, "Band", "musician").await;
    let app = common::build_test_app(pool);
    let token = app.token_for(&listener);

    let kept = common::create_track(&app, musician.id, "Kept").await;
    let broken = common::create_track(&app, musician.id, "Broken").await;
    listen(&app, &token, kept.id).await;
    listen(&app, &token, broken.id).await;

    // The row survives but its audio is gone.
    std::fs::remove_file(app.state.config.storage_root.join(&broken.file_path)).unwrap();
    let response = get_auth(app.router(), "/api/v1/tracks/last-listened", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fail_policy_still_serves_clean_lists(pool: PgPool) {
    let listener = common::create_user(&pool, "Listener", "listener").await;
    let musician = common::create_user(&pool, "Band", "musician").await;
    let app = common::build_test_app_with(pool, StalePolicy::Fail);
    let token = app.token_for(&listener);

    let track = common::create_track(&app, musician.id, "Song").await;
    listen(&app, &token, track.id).await;
    assert_eq!(last_listened(&app, &token, "tracks").await, vec![track.id]);
}
