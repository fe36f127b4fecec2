use crate::app::waitlist_service::{
    BalanceUpdate, ClaimOutcome, ShareText, TaskOutcome, WalletOutcome,
};
use crate::domain::model::{Account, BlacklistEntry, LeaderboardEntry, PointEntry, Position};
use crate::domain::tasks::Task;
use crate::transport::http::handlers::{
    account, health, invitation, leaderboard, tasks, wallet,
};
use crate::transport::http::types::{
    ApiResponse, AppState, ClaimCodeRequest, ConnectWalletRequest, RefreshBalanceRequest,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        account::get_account_handler,
        account::get_banned_handler,
        account::points_history_handler,
        account::share_handler,
        invitation::claim_code_handler,
        wallet::wallet_status_handler,
        wallet::connect_wallet_handler,
        wallet::refresh_balance_handler,
        tasks::task_status_handler,
        tasks::complete_task_handler,
        leaderboard::leaderboard_count_handler,
        leaderboard::leaderboard_position_handler,
        leaderboard::leaderboard_page_handler
    ),
    components(schemas(
        ApiResponse,
        ClaimCodeRequest,
        ConnectWalletRequest,
        RefreshBalanceRequest,
        Account,
        BlacklistEntry,
        PointEntry,
        LeaderboardEntry,
        Position,
        Task,
        ClaimOutcome,
        WalletOutcome,
        BalanceUpdate,
        TaskOutcome,
        ShareText
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/account", get(account::get_account_handler))
        .route("/api/account/banned", get(account::get_banned_handler))
        .route("/api/invitation/claim", post(invitation::claim_code_handler))
        .route("/api/wallet", get(wallet::wallet_status_handler))
        .route("/api/wallet/connect", post(wallet::connect_wallet_handler))
        .route("/api/wallet/balance", post(wallet::refresh_balance_handler))
        .route("/api/tasks/:task", get(tasks::task_status_handler))
        .route("/api/tasks/:task/complete", post(tasks::complete_task_handler))
        .route("/api/points", get(account::points_history_handler))
        .route("/api/leaderboard", get(leaderboard::leaderboard_page_handler))
        .route(
            "/api/leaderboard/count",
            get(leaderboard::leaderboard_count_handler),
        )
        .route(
            "/api/leaderboard/position",
            get(leaderboard::leaderboard_position_handler),
        )
        .route("/api/share", get(account::share_handler))
        .with_state(app_state)
}
