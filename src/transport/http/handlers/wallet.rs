use crate::app::waitlist_service::WalletOutcome;
use crate::transport::http::auth::AuthUser;
use crate::transport::http::error::{from_wallet_service, ApiErr};
use crate::transport::http::handlers::common::{ok, rejected};
use crate::transport::http::types::{
    json_422, ApiResponse, AppState, ConnectWalletRequest, RefreshBalanceRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/wallet",
    responses(
        (status = 200, description = "Whether the caller has connected a wallet", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse)
    )
)]
pub async fn wallet_status_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiErr> {
    let connected = state
        .service
        .has_connected_wallet(&user)
        .await
        .map_err(ApiErr::from_service("fetch wallet"))?;
    ok(&serde_json::json!({ "connected": connected }))
}

#[utoipa::path(
    post,
    path = "/api/wallet/connect",
    request_body = ConnectWalletRequest,
    responses(
        (status = 200, description = "Wallet connected (or already connected)", body = ApiResponse),
        (status = 400, description = "Invalid wallet or balance", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse),
        (status = 404, description = "Caller has no account", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn connect_wallet_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    request: Result<Json<ConnectWalletRequest>, JsonRejection>,
) -> Result<Response, ApiErr> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return Ok(json_422(e, r#"{"principal_id": "...", "balance": 0}"#).into_response())
        }
    };
    if request.principal_id.trim().is_empty() {
        return Err(ApiErr::bad_request("principal_id must not be empty"));
    }

    let outcome = state
        .service
        .connect_wallet(&user, &request.principal_id, request.balance)
        .await
        .map_err(from_wallet_service("connect wallet"))?;

    match outcome {
        WalletOutcome::NoAccount => rejected(StatusCode::NOT_FOUND, &outcome, "account not found"),
        _ => ok(&outcome),
    }
}

#[utoipa::path(
    post,
    path = "/api/wallet/balance",
    request_body = RefreshBalanceRequest,
    responses(
        (status = 200, description = "Balance recorded; tier crossings awarded", body = ApiResponse),
        (status = 400, description = "Invalid wallet or balance", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse),
        (status = 404, description = "No account or no connected wallet", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn refresh_balance_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    request: Result<Json<RefreshBalanceRequest>, JsonRejection>,
) -> Result<Response, ApiErr> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"balance": 0}"#).into_response()),
    };

    let update = state
        .service
        .refresh_wallet_balance(&user, request.balance)
        .await
        .map_err(from_wallet_service("update wallet balance"))?
        .ok_or_else(|| ApiErr::not_found("no account with a connected wallet"))?;
    ok(&update)
}
