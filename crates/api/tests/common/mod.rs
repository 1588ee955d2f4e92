#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use cadence_api::auth::jwt::{generate_access_token, JwtConfig};
use cadence_api::auth::password::hash_password;
use cadence_api::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use cadence_api::router::build_app_router;
use cadence_api::state::AppState;
use cadence_core::file_store::{AVATARS_DIR, TRACKS_DIR};
use cadence_core::recency::StalePolicy;
use cadence_core::types::DbId;
use cadence_db::models::track::{CreateTrack, Track};
use cadence_db::models::user::{CreateUser, User};
use cadence_db::repositories::{TrackRepo, UserRepo};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

/// Password used for every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "correct-horse-42!";

const BOUNDARY: &str = "cadence-test-boundary";

/// Build a test `ServerConfig` with safe defaults rooted at `storage_root`.
pub fn test_config(storage_root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_root: storage_root.to_path_buf(),
        tracks_dir: TRACKS_DIR.to_string(),
        avatars_dir: AVATARS_DIR.to_string(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        recency_stale_policy: StalePolicy::Skip,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            issuer: "cadence".to_string(),
            audience: "cadence-clients".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The application under test plus the temporary storage it writes to.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _storage: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Mint an access token for `user` the same way login does.
    pub fn token_for(&self, user: &User) -> String {
        generate_access_token(user.id, &user.role, &self.state.config.jwt)
            .expect("token generation should succeed")
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a fresh temporary storage root.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, StalePolicy::Skip)
}

pub fn build_test_app_with(pool: PgPool, stale_policy: StalePolicy) -> TestApp {
    build_test_app_configured(pool, |config| config.recency_stale_policy = stale_policy)
}

/// Like [`build_test_app`], with `adjust` applied to the config first.
pub fn build_test_app_configured(pool: PgPool, adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let storage = tempfile::tempdir().expect("tempdir should be created");
    let mut config = test_config(storage.path());
    adjust(&mut config);

    let state = AppState::new(pool, config.clone());
    let router = build_app_router(state.clone(), &config);
    TestApp {
        router,
        state,
        _storage: storage,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a user directly in the database with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{}@test.com", name.to_lowercase()),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
        status: "active".to_string(),
        birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Store a short silent MP3 for `owner_id` and insert its track row.
pub async fn create_track(app: &TestApp, owner_id: DbId, name: &str) -> Track {
    let file_name = format!("{}.mp3", name.to_lowercase().replace(' ', "_"));
    let file_path = app
        .state
        .file_store
        .write(&silent_mp3(40), owner_id, TRACKS_DIR, &file_name)
        .await
        .expect("file write should succeed");
    TrackRepo::create(
        &app.state.pool,
        &CreateTrack {
            user_id: owner_id,
            name: name.to_string(),
            file_path,
        },
    )
    .await
    .expect("track creation should succeed")
}

pub async fn set_free_tracks(pool: &PgPool, user_id: DbId, amount: i32) {
    sqlx::query("UPDATE users SET free_tracks = $2 WHERE id = $1")
        .bind(user_id)
        .bind(amount)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn free_tracks(pool: &PgPool, user_id: DbId) -> i32 {
    UserRepo::find_by_id(pool, user_id)
        .await
        .unwrap()
        .unwrap()
        .free_tracks
}

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo: `frames` frames of silence.
pub fn silent_mp3(frames: usize) -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x04]);
        bytes.extend(std::iter::repeat(0u8).take(FRAME_LEN - 4));
    }
    bytes
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn json_auth(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    json_auth(app, Method::POST, uri, token, body).await
}

/// POST or DELETE without a body.
pub async fn send_auth(app: Router, method: Method, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a `multipart/form-data` body with text fields and an optional file.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}
