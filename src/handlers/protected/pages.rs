use axum::response::Redirect;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, RequireAuth};

/// GET / - send the caller to the landing page for its role
pub async fn home(RequireAuth(session): RequireAuth) -> Redirect {
    Redirect::temporary(session.landing())
}

/// GET /dashboard - default landing page
pub async fn dashboard(RequireAuth(session): RequireAuth) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "page": "dashboard",
        "user": session.principal,
    }))
}
