use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cadence_core::audio::AudioError;
use cadence_core::error::CoreError;
use cadence_core::file_store::FileStoreError;
use cadence_core::recency::RecencyError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `cadence_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored file could not be read or written.
    #[error(transparent)]
    FileStore(#[from] FileStoreError),

    /// A multipart upload body was rejected (malformed or over the size limit).
    #[error(transparent)]
    Upload(#[from] MultipartError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<RecencyError<sqlx::Error>> for AppError {
    fn from(err: RecencyError<sqlx::Error>) -> Self {
        match err {
            RecencyError::Core(core) => AppError::Core(core),
            RecencyError::Store(db) => AppError::Database(db),
        }
    }
}

impl From<AudioError> for AppError {
    fn from(err: AudioError) -> Self {
        AppError::InternalError(format!("Audio decode failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- File store ---
            AppError::FileStore(err) => classify_file_store_error(err),

            // --- HTTP-specific errors ---
            AppError::Upload(err) => classify_upload_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::InvalidTimestamp(msg) => {
            (StatusCode::BAD_REQUEST, "INVALID_TIMESTAMP", msg.clone())
        }
        CoreError::StaleReference { .. } => {
            (StatusCode::NOT_FOUND, "STALE_REFERENCE", core.to_string())
        }
        CoreError::SubscriptionExpired => (
            StatusCode::FORBIDDEN,
            "SUBSCRIPTION_EXPIRED",
            core.to_string(),
        ),
        CoreError::NoFreeTracks => (StatusCode::FORBIDDEN, "NO_FREE_TRACKS", core.to_string()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn classify_file_store_error(err: &FileStoreError) -> (StatusCode, &'static str, String) {
    match err {
        FileStoreError::NotFound(path) => {
            tracing::warn!(path = %path, "Stored file is missing");
            (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Stored file not found".to_string(),
            )
        }
        FileStoreError::InvalidName(name) => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            format!("Invalid file name: {name}"),
        ),
        FileStoreError::InvalidPath(_) | FileStoreError::Io { .. } => {
            tracing::error!(error = %err, "File store error");
            internal()
        }
    }
}

/// Keep axum's status for a rejected upload: 413 when the body exceeds the
/// route's limit, 400 for a malformed form.
fn classify_upload_error(err: &MultipartError) -> (StatusCode, &'static str, String) {
    let status = err.status();
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "PAYLOAD_TOO_LARGE"
    } else {
        "BAD_REQUEST"
    };
    (status, code, err.body_text())
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn refusals_are_forbidden() {
        assert_eq!(
            status_of(CoreError::SubscriptionExpired.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(CoreError::NoFreeTracks.into()), StatusCode::FORBIDDEN);
    }

    #[test]
    fn invalid_timestamp_is_bad_request() {
        let err = CoreError::InvalidTimestamp("in the future".into());
        assert_eq!(status_of(err.into()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stale_reference_is_not_found() {
        let err = CoreError::StaleReference {
            entity: "Track",
            id: 9,
        };
        assert_eq!(status_of(err.into()), StatusCode::NOT_FOUND);
    }

    #[test]
    fn recency_errors_unwrap_to_their_source() {
        let err: AppError = RecencyError::<sqlx::Error>::Store(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));

        let err: AppError = RecencyError::<sqlx::Error>::Core(CoreError::NoFreeTracks).into();
        assert!(matches!(err, AppError::Core(CoreError::NoFreeTracks)));
    }

    #[tokio::test]
    async fn missing_file_hides_storage_path() {
        use http_body_util::BodyExt;

        let err: AppError = FileStoreError::NotFound("tracks/1_a.mp3".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("Stored file not found"));
        assert!(!body.contains("tracks/1_a.mp3"), "leaked path in {body}");
    }
}
