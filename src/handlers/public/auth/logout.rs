use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::session::LOGIN_PATH;

/// POST /api/auth/logout (and DELETE /api/auth/session) - destroy the session
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    tracing::debug!("Session destroyed by logout");
    (state.sessions.destroy(jar), Json(json!({ "redirect": LOGIN_PATH })))
}
