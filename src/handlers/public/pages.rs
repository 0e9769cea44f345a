use axum::{extract::Query, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

/// GET /login - the sign-in page; surfaces a failed attempt's message
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<Value> {
    Json(json!({
        "page": "login",
        "action": "/api/auth/login",
        "error": query.error,
    }))
}

/// GET /health - liveness
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
