use crate::crypto::jwt::verify_token;
use crate::domain::model::User;
use crate::transport::http::error::ApiErr;
use crate::transport::http::types::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;

/// Caller identity from `Authorization: Bearer <jwt>`.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiErr::unauthorized("missing or invalid Authorization header"))?;

        let now = Utc::now().timestamp().max(0) as u64;
        verify_token(token, &state.jwt_secret, now)
            .map(AuthUser)
            .map_err(|e| {
                tracing::debug!("rejected token: {e}");
                ApiErr::unauthorized(e.to_string())
            })
    }
}
