//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cadence_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `musician` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn upload(RequireMusician(user): RequireMusician) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireMusician(pub AuthUser);

impl FromRequestParts<AppState> for RequireMusician {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_musician() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Musician role required".into(),
            )));
        }
        Ok(RequireMusician(user))
    }
}
