use crate::transport::http::auth::AuthUser;
use crate::transport::http::error::ApiErr;
use crate::transport::http::handlers::common::ok;
use crate::transport::http::types::{ApiResponse, AppState, LeaderboardQuery};
use axum::extract::{Query, State};
use axum::response::Response;

const DEFAULT_PAGE_SPAN: i64 = 9;

#[utoipa::path(
    get,
    path = "/api/leaderboard/count",
    responses(
        (status = 200, description = "Number of accounts on the leaderboard", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse)
    )
)]
pub async fn leaderboard_count_handler(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Response, ApiErr> {
    let total = state
        .service
        .leaderboard_count()
        .await
        .map_err(ApiErr::from_service("count leaderboard"))?;
    ok(&serde_json::json!({ "total": total }))
}

#[utoipa::path(
    get,
    path = "/api/leaderboard/position",
    responses(
        (status = 200, description = "The caller's rank, or null without an account", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse)
    )
)]
pub async fn leaderboard_position_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiErr> {
    let position = state
        .service
        .leaderboard_position(&user)
        .await
        .map_err(ApiErr::from_service("rank account"))?;
    ok(&position)
}

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard entries start..=end", body = ApiResponse),
        (status = 400, description = "Invalid range", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse)
    )
)]
pub async fn leaderboard_page_handler(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Response, ApiErr> {
    if query.start < 0 {
        return Err(ApiErr::bad_request("start must be >= 0"));
    }
    let end = query
        .end
        .unwrap_or_else(|| query.start.saturating_add(DEFAULT_PAGE_SPAN));
    let entries = state
        .service
        .leaderboard_page(query.start, end)
        .await
        .map_err(ApiErr::from_service("fetch leaderboard"))?;
    ok(&entries)
}
