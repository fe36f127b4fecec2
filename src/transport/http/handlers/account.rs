use crate::transport::http::auth::AuthUser;
use crate::transport::http::error::ApiErr;
use crate::transport::http::handlers::common::ok;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::response::Response;

#[utoipa::path(
    get,
    path = "/api/account",
    responses(
        (status = 200, description = "The caller's account, or null before redemption", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse)
    )
)]
pub async fn get_account_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiErr> {
    let account = state
        .service
        .fetch_account(&user)
        .await
        .map_err(ApiErr::from_service("fetch account"))?;
    ok(&account)
}

#[utoipa::path(
    get,
    path = "/api/account/banned",
    responses(
        (status = 200, description = "Blacklist entry for the caller's email, or null", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse)
    )
)]
pub async fn get_banned_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiErr> {
    let entry = state
        .service
        .fetch_banned_account(&user)
        .await
        .map_err(ApiErr::from_service("fetch blacklist"))?;
    ok(&entry)
}

#[utoipa::path(
    get,
    path = "/api/points",
    responses(
        (status = 200, description = "The caller's points ledger", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse)
    )
)]
pub async fn points_history_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiErr> {
    let entries = state
        .service
        .points_history(&user)
        .await
        .map_err(ApiErr::from_service("fetch points"))?;
    ok(&entries)
}

#[utoipa::path(
    get,
    path = "/api/share",
    responses(
        (status = 200, description = "Referral message and link", body = ApiResponse),
        (status = 404, description = "Caller has no account", body = ApiResponse)
    )
)]
pub async fn share_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiErr> {
    let share = state
        .service
        .share_text(&user)
        .await
        .map_err(ApiErr::from_service("build share text"))?
        .ok_or_else(|| ApiErr::not_found("account not found"))?;
    ok(&share)
}
