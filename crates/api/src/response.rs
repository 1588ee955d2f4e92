//! `{ "data": ... }` envelope used by every JSON endpoint.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// 201 with the new resource in the envelope.
pub type Created<T> = (StatusCode, Json<DataResponse<T>>);

pub fn created<T: Serialize>(data: T) -> Created<T> {
    (StatusCode::CREATED, Json(DataResponse { data }))
}
