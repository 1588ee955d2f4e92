use axum::Json;

use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// GET /api/v1/ping
///
/// Token check for clients; answers `pong` to any authenticated caller.
pub async fn ping(user: AuthUser) -> Json<DataResponse<&'static str>> {
    tracing::debug!(user_id = user.user_id, "Ping");
    Json(DataResponse { data: "pong" })
}
