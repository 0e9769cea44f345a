use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::paths::RoutePolicy;
use crate::app::AppState;
use crate::session::{resolve_cached, Credentials, Resolution, DEFAULT_LANDING, LOGIN_PATH};

/// What the edge filter does with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    Pass,
    /// Pass through with `Authorization: Bearer <token>` set on the request.
    PassWithBearer(String),
    Redirect { to: &'static str, clear: bool },
}

/// Decide the fate of a request from its path and transport credentials only.
pub fn decide(policy: &RoutePolicy, path: &str, credentials: &Credentials) -> EdgeDecision {
    if policy.is_public(path) {
        return EdgeDecision::Pass;
    }

    let Some(token) = credentials.token.as_ref().filter(|_| credentials.is_complete()) else {
        tracing::debug!("Edge - missing credentials for {}, redirecting to login", path);
        return EdgeDecision::Redirect {
            to: LOGIN_PATH,
            clear: !credentials.is_empty(),
        };
    };

    if policy.is_admin(path) {
        match resolve_cached(credentials) {
            Resolution::Present(session) if session.is_admin() => {}
            Resolution::Present(_) => {
                tracing::debug!("Edge - non-admin principal on {}, redirecting to dashboard", path);
                return EdgeDecision::Redirect {
                    to: DEFAULT_LANDING,
                    clear: false,
                };
            }
            _ => {
                return EdgeDecision::Redirect {
                    to: LOGIN_PATH,
                    clear: true,
                }
            }
        }
    }

    if policy.is_api(path) {
        EdgeDecision::PassWithBearer(token.clone())
    } else {
        EdgeDecision::Pass
    }
}

/// First authorization checkpoint; runs before every route handler.
///
/// Reads cookies (and the bearer header for API paths) but never calls the
/// identity API.
pub async fn edge_filter(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    let mut credentials = Credentials::from_headers(request.headers());
    if state.routes.is_api(&path) {
        credentials = credentials.with_bearer_fallback(request.headers());
    }

    match decide(&state.routes, &path, &credentials) {
        EdgeDecision::Pass => next.run(request).await,
        EdgeDecision::PassWithBearer(token) => match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                request.headers_mut().insert(AUTHORIZATION, value);
                next.run(request).await
            }
            Err(_) => {
                tracing::warn!("Edge - token cookie is not a valid header value, clearing session");
                redirect(&state, LOGIN_PATH, true)
            }
        },
        EdgeDecision::Redirect { to, clear } => redirect(&state, to, clear),
    }
}

fn redirect(state: &AppState, to: &'static str, clear: bool) -> Response {
    let jar = CookieJar::new();
    let jar = if clear { state.sessions.destroy(jar) } else { jar };
    (jar, Redirect::temporary(to)).into_response()
}
