use axum::{extract::State, http::HeaderMap};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::session::{cookies::bearer_token, Principal};

/// GET /api/users/me - fresh profile from the identity API
///
/// Relies on the `Authorization` header the edge filter injects for the API
/// namespace.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Principal> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
    let principal = state.identity.me(&token).await?;
    Ok(ApiResponse::success(principal))
}
