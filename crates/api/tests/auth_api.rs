//! Registration, login and profile endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get_auth, json_auth, post_json, post_json_auth, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

fn registration(name: &str, email: &str) -> serde_json::Value {
    json!({
        "name": name,
        "email": email,
        "role": "listener",
        "birthday": "1990-04-01",
        "password": "correct-horse-42!",
    })
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_returns_token_and_profile(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.router(),
        "/api/v1/users/register",
        registration("Ada", "ada@example.com"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["expires_in"], 15 * 60);
    assert_eq!(json["data"]["user"]["name"], "Ada");
    assert_eq!(json["data"]["user"]["role"], "listener");
    assert_eq!(json["data"]["user"]["free_tracks"], 15);
    assert!(json["data"]["user"].get("password_hash").is_none());

    // The token works right away.
    let token = json["data"]["access_token"].as_str().unwrap();
    let response = get_auth(app.router(), "/api/v1/users/me", token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);

    let first = post_json(
        app.router(),
        "/api/v1/users/register",
        registration("Ada", "ada@example.com"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(
        app.router(),
        "/api/v1/users/register",
        registration("Other Ada", "ADA@example.com"),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_invalid_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut underage = registration("Kid", "kid@example.com");
    underage["birthday"] = json!(chrono::Utc::now().date_naive().to_string());

    let mut weak = registration("Weak", "weak@example.com");
    weak["password"] = json!("password");

    let mut admin = registration("Root", "root@example.com");
    admin["role"] = json!("admin");

    let bad_email = registration("Nomail", "nomail");

    for body in [underage, weak, admin, bad_email] {
        let response = post_json(app.router(), "/api/v1/users/register", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = common::create_user(&pool, "Grace", "musician").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.router(),
        "/api/v1/users/login",
        json!({ "email": "grace@test.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["role"], "musician");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_failures_are_unauthorized(pool: PgPool) {
    common::create_user(&pool, "Grace", "listener").await;
    let app = common::build_test_app(pool);

    let wrong_password = json!({ "email": "grace@test.com", "password": "nope-nope-123!" });
    let unknown_email = json!({ "email": "nobody@test.com", "password": TEST_PASSWORD });

    for body in [wrong_password, unknown_email] {
        let response = post_json(app.router(), "/api/v1/users/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid email or password");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blocked_user_cannot_log_in(pool: PgPool) {
    let user = common::create_user(&pool, "Blocked", "listener").await;
    sqlx::query("UPDATE users SET status = 'blocked' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = post_json(
        app.router(),
        "/api/v1/users/login",
        json!({ "email": "blocked@test.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_profile(pool: PgPool) {
    let user = common::create_user(&pool, "Grace", "listener").await;
    let app = common::build_test_app(pool);
    let token = app.token_for(&user);

    let response = json_auth(
        app.router(),
        Method::PUT,
        "/api/v1/users/me",
        &token,
        json!({ "name": "Grace Hopper", "email": "hopper@test.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Grace Hopper");
    assert_eq!(json["data"]["email"], "hopper@test.com");

    let response = json_auth(
        app.router(),
        Method::PUT,
        "/api/v1/users/me",
        &token,
        json!({ "name": "G", "email": "hopper@test.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_password(pool: PgPool) {
    let user = common::create_user(&pool, "Grace", "listener").await;
    let app = common::build_test_app(pool);
    let token = app.token_for(&user);
    let uri = "/api/v1/users/me/password";

    // Old password must verify.
    let response = post_json_auth(
        app.router(),
        uri,
        &token,
        json!({ "old_password": "wrong-wrong-42!", "new_password": "brand-new-pass-7!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // New password must differ.
    let response = post_json_auth(
        app.router(),
        uri,
        &token,
        json!({ "old_password": TEST_PASSWORD, "new_password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // New password must satisfy the policy.
    let response = post_json_auth(
        app.router(),
        uri,
        &token,
        json!({ "old_password": TEST_PASSWORD, "new_password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.router(),
        uri,
        &token,
        json!({ "old_password": TEST_PASSWORD, "new_password": "brand-new-pass-7!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app.router(),
        "/api/v1/users/login",
        json!({ "email": "grace@test.com", "password": "brand-new-pass-7!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_avatar_upload_and_fetch(pool: PgPool) {
    let user = common::create_user(&pool, "Grace", "listener").await;
    let viewer = common::create_user(&pool, "Viewer", "listener").await;
    let app = common::build_test_app(pool);
    let token = app.token_for(&user);

    // No avatar yet.
    let response = get_auth(app.router(), "/api/v1/users/me/avatar", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let png = b"\x89PNG\r\n\x1a\nnot-really-a-png";
    let response = common::post_multipart(
        app.router(),
        "/api/v1/users/me/avatar",
        &token,
        &[],
        Some(("me.png", png.as_slice())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.router(), "/api/v1/users/me/avatar", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(common::body_bytes(response).await, png);

    let uri = format!("/api/v1/users/{}/avatar", user.id);
    let response = get_auth(app.router(), &uri, &app.token_for(&viewer)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_avatar_upload_requires_file(pool: PgPool) {
    let user = common::create_user(&pool, "Grace", "listener").await;
    let app = common::build_test_app(pool);

    let response = common::post_multipart(
        app.router(),
        "/api/v1/users/me/avatar",
        &app.token_for(&user),
        &[("note", "no file here")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
