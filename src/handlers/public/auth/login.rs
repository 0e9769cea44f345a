use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Json, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::session::LOGIN_PATH;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    /// Script clients get JSON back and navigate themselves.
    Json,
    /// Browser form posts get a real redirect.
    Form,
}

/// Accepts either a JSON body or an urlencoded form.
pub struct LoginForm(pub LoginKind, pub LoginRequest);

#[async_trait]
impl<S> FromRequest<S> for LoginForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(body) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(LoginForm(LoginKind::Form, body))
        } else {
            let Json(body) = Json::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(LoginForm(LoginKind::Json, body))
        }
    }
}

/// POST /api/auth/login - exchange credentials for a session
///
/// On success both session cookies are set and the caller is pointed at the
/// landing page for its role:
///
/// ```json
/// {
///   "redirect": "/admin-dashboard",
///   "user": { "id": 1, "email": "admin@x.com", "role": { "name": "Administrator", "type": "administrator" }, "name": "admin" },
///   "issued_at": "2025-01-01T00:00:00Z",
///   "expires_at": "2025-01-08T00:00:00Z"
/// }
/// ```
///
/// On failure no cookie is written and the identity API's message is returned
/// verbatim (form posts are sent back to `/login?error=...`).
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    LoginForm(kind, request): LoginForm,
) -> Response {
    let identifier = request.identifier.trim();
    let result = if identifier.is_empty() || request.password.is_empty() {
        Err(ApiError::bad_request("Identifier and password are required"))
    } else {
        state
            .sessions
            .login(identifier, &request.password)
            .await
            .map_err(|e| {
                tracing::warn!("Login failed: {}", e);
                ApiError::from(e)
            })
    };

    match (kind, result) {
        (LoginKind::Json, Ok(outcome)) => {
            let jar = state.sessions.persist(jar, &outcome.session);
            let body = json!({
                "redirect": outcome.redirect,
                "user": outcome.session.principal,
                "issued_at": outcome.issued_at,
                "expires_at": outcome.expires_at,
            });
            (jar, Json(body)).into_response()
        }
        (LoginKind::Form, Ok(outcome)) => {
            let jar = state.sessions.persist(jar, &outcome.session);
            (jar, Redirect::to(outcome.redirect)).into_response()
        }
        (LoginKind::Json, Err(e)) => e.into_response(),
        (LoginKind::Form, Err(e)) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("error", e.message())
                .finish();
            Redirect::to(&format!("{}?{}", LOGIN_PATH, query)).into_response()
        }
    }
}
