use crate::app::waitlist_service::WaitlistService;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WaitlistService>,
    /// HS256 secret shared with the OAuth provider.
    pub jwt_secret: Arc<str>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn rejected(data: JsonValue, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ClaimCodeRequest {
    pub code: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ConnectWalletRequest {
    pub principal_id: String,
    /// Token balance reported by the wallet adapter (ignored when balances are read on-chain).
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct RefreshBalanceRequest {
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct LeaderboardQuery {
    /// First index (0-based, inclusive).
    #[serde(default)]
    pub start: i64,
    /// Last index (inclusive). Defaults to `start + 9`.
    #[serde(default)]
    pub end: Option<i64>,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid JSON body: {} (expected: {})", err, expected)),
        }),
    )
}
