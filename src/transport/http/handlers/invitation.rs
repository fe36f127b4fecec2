use crate::app::waitlist_service::ClaimOutcome;
use crate::transport::http::auth::AuthUser;
use crate::transport::http::error::ApiErr;
use crate::transport::http::handlers::common::{ok, rejected};
use crate::transport::http::types::{json_422, ApiResponse, AppState, ClaimCodeRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/invitation/claim",
    request_body = ClaimCodeRequest,
    responses(
        (status = 200, description = "Account created", body = ApiResponse),
        (status = 400, description = "Unknown or used invitation code", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse),
        (status = 403, description = "Caller is blacklisted", body = ApiResponse),
        (status = 409, description = "Caller already has an account", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn claim_code_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    request: Result<Json<ClaimCodeRequest>, JsonRejection>,
) -> Result<Response, ApiErr> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"code": "..."}"#).into_response()),
    };

    let outcome = state
        .service
        .claim_code(&user, &request.code)
        .await
        .map_err(ApiErr::from_service("claim invitation code"))?;

    match &outcome {
        ClaimOutcome::Created { .. } => ok(&outcome),
        ClaimOutcome::AlreadyRegistered => {
            rejected(StatusCode::CONFLICT, &outcome, "account already exists")
        }
        ClaimOutcome::Banned => rejected(StatusCode::FORBIDDEN, &outcome, "this account is banned"),
        ClaimOutcome::UnknownCode => rejected(
            StatusCode::BAD_REQUEST,
            &outcome,
            "please enter a valid invitation code",
        ),
    }
}
