//! Bearer-token authentication.
//!
//! Every Cadence endpoint except `/health`, register and login takes an
//! [`AuthUser`]; listens, purchases and recency lists are all keyed by the
//! user id it carries.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use cadence_core::error::CoreError;
use cadence_core::roles::ROLE_MUSICIAN;
use cadence_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, as stated by a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `claims.sub`.
    pub user_id: DbId,
    /// `listener` or `musician`.
    pub role: String,
}

impl AuthUser {
    pub fn is_musician(&self) -> bool {
        self.role == ROLE_MUSICIAN
    }
}

/// The token from an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| CoreError::Unauthorized("Authorization header is not valid text".into()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        )),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            CoreError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
