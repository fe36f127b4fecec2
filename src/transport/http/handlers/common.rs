use crate::transport::http::error::ApiErr;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value as JsonValue;

pub fn to_data<T: Serialize>(value: &T) -> Result<JsonValue, ApiErr> {
    serde_json::to_value(value).map_err(ApiErr::from_service("serialize response"))
}

pub fn ok<T: Serialize>(value: &T) -> Result<Response, ApiErr> {
    Ok((StatusCode::OK, Json(ApiResponse::ok(to_data(value)?))).into_response())
}

/// A business rejection: `success: false` with the outcome kept in `data`.
pub fn rejected<T: Serialize>(
    status: StatusCode,
    value: &T,
    error: &str,
) -> Result<Response, ApiErr> {
    Ok((status, Json(ApiResponse::rejected(to_data(value)?, error))).into_response())
}
