use serde_json::{json, Value};

use crate::middleware::{ApiResponse, RequireAdmin};

/// GET /admin-dashboard - administrator landing page
pub async fn admin_dashboard(RequireAdmin(session): RequireAdmin) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "page": "admin-dashboard",
        "user": session.principal,
    }))
}
