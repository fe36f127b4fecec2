use crate::infra::balance::is_input_error;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Failure response in the `ApiResponse` envelope.
#[derive(Debug)]
pub struct ApiErr {
    status: StatusCode,
    message: String,
}

impl ApiErr {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Build a closure that logs a store/RPC error and returns `500 Internal Server Error`.
    pub fn from_service<E: fmt::Display>(context: &str) -> impl FnOnce(E) -> Self + '_ {
        move |e| {
            tracing::error!("{context}: {e:#}");
            Self::internal(format!("{context} failed"))
        }
    }
}

/// Like `from_service`, but client-supplied balance/wallet errors become `400 Bad Request`.
pub fn from_wallet_service(context: &str) -> impl FnOnce(anyhow::Error) -> ApiErr + '_ {
    move |e| {
        if is_input_error(&e) {
            tracing::debug!("{context}: rejected input: {e}");
            ApiErr::bad_request(e.to_string())
        } else {
            ApiErr::from_service(context)(e)
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some(self.message),
            }),
        )
            .into_response()
    }
}
