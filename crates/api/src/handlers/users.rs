//! Handlers for the `/users` resource: registration, login, profile and avatars.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use cadence_core::error::CoreError;
use cadence_core::file_store::content_type_for;
use cadence_core::roles::STATUS_BLOCKED;
use cadence_core::types::DbId;
use cadence_core::users::{check_password_policy, ProfileUpdate, Registration};
use cadence_db::models::user::{CreateUser, User, UserProfile};
use cadence_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use super::read_upload;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users/me/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Returned by registration and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserProfile,
}

// ---------------------------------------------------------------------------
// Registration and login
// ---------------------------------------------------------------------------

/// POST /api/v1/users/register
///
/// Create an account and sign it in. Duplicate emails are rejected with 409.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<Registration>,
) -> AppResult<Created<AuthResponse>> {
    input.check()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_lowercase(),
        password_hash,
        role: input.role,
        status: input.status,
        birthday: input.birthday,
    };
    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    let response = auth_response(&state, user)?;
    Ok(created(response))
}

/// POST /api/v1/users/login
///
/// Exchange email and password for an access token. Unknown emails and wrong
/// passwords produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let email = input.email.trim().to_lowercase();
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    if user.status == STATUS_BLOCKED {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is blocked".into(),
        )));
    }

    let response = auth_response(&state, user)?;
    Ok(Json(DataResponse { data: response }))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let user = find_user(&state, user.user_id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/me
///
/// Replace the caller's name and email.
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ProfileUpdate>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    input.check()?;

    let updated = UserRepo::update_profile(
        &state.pool,
        user.user_id,
        input.name.trim(),
        &input.email.trim().to_lowercase(),
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "User",
        id: user.user_id,
    })?;

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// POST /api/v1/users/me/password
///
/// The old password must verify and the new one must differ from it and
/// satisfy the password policy.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let current = find_user(&state, user.user_id).await?;

    let old_valid = verify_password(&input.old_password, &current.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !old_valid {
        return Err(CoreError::Validation("Old password is incorrect".into()).into());
    }
    if input.old_password == input.new_password {
        return Err(CoreError::Validation(
            "New password must differ from the old password".into(),
        )
        .into());
    }
    check_password_policy(&input.new_password).map_err(CoreError::Validation)?;

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password_hash(&state.pool, user.user_id, &new_hash).await?;

    tracing::info!(user_id = user.user_id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Avatars
// ---------------------------------------------------------------------------

/// POST /api/v1/users/me/avatar
///
/// Multipart form with a `file` field. Replaces any previous avatar.
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<StatusCode> {
    let (file_name, data) = read_upload(multipart).await?.require_file()?;

    let path = state
        .file_store
        .write(&data, user.user_id, &state.config.avatars_dir, &file_name)
        .await?;
    UserRepo::set_avatar_path(&state.pool, user.user_id, &path).await?;

    tracing::info!(user_id = user.user_id, %path, "Avatar updated");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/me/avatar
pub async fn get_my_avatar(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    avatar_response(&state, user.user_id).await
}

/// GET /api/v1/users/{id}/avatar
pub async fn get_avatar(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    avatar_response(&state, id).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: user.into(),
    })
}

async fn avatar_response(state: &AppState, user_id: DbId) -> AppResult<Response> {
    let user = find_user(state, user_id).await?;
    if user.avatar_path.is_empty() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Avatar",
            id: user_id,
        }));
    }

    let bytes = state.file_store.read(&user.avatar_path).await?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&user.avatar_path))
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        .body(Body::from(bytes))
        .map_err(|e| AppError::InternalError(e.to_string()))
}
