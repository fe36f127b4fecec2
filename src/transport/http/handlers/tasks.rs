use crate::app::waitlist_service::TaskOutcome;
use crate::domain::tasks::Task;
use crate::transport::http::auth::AuthUser;
use crate::transport::http::error::ApiErr;
use crate::transport::http::handlers::common::{ok, rejected};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;

fn parse_task(raw: &str) -> Result<Task, ApiErr> {
    raw.parse::<Task>().map_err(ApiErr::not_found)
}

#[utoipa::path(
    get,
    path = "/api/tasks/{task}",
    params(
        ("task" = String, Path, description = "Task slug (e.g. twitter_follow)")
    ),
    responses(
        (status = 200, description = "Whether the caller completed the task", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse),
        (status = 404, description = "Unknown task", body = ApiResponse)
    )
)]
pub async fn task_status_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(task): Path<String>,
) -> Result<Response, ApiErr> {
    let task = parse_task(&task)?;
    let completed = state
        .service
        .task_completed(&user, task)
        .await
        .map_err(ApiErr::from_service("fetch task"))?;
    ok(&serde_json::json!({ "task": task, "completed": completed }))
}

#[utoipa::path(
    post,
    path = "/api/tasks/{task}/complete",
    params(
        ("task" = String, Path, description = "Task slug (e.g. discord_join)")
    ),
    responses(
        (status = 200, description = "Task points awarded", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse),
        (status = 404, description = "Unknown task or no account", body = ApiResponse),
        (status = 409, description = "Task already completed", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn complete_task_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(task): Path<String>,
) -> Result<Response, ApiErr> {
    let task = parse_task(&task)?;
    let outcome = state
        .service
        .complete_task(&user, task)
        .await
        .map_err(ApiErr::from_service("complete task"))?;

    match outcome {
        TaskOutcome::Awarded { .. } => ok(&outcome),
        TaskOutcome::AlreadyCompleted => rejected(
            StatusCode::CONFLICT,
            &outcome,
            "points for this task were already added",
        ),
        TaskOutcome::NoAccount => rejected(StatusCode::NOT_FOUND, &outcome, "account not found"),
    }
}
