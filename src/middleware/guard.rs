use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::session::{Credentials, Resolution, Session, DEFAULT_LANDING, LOGIN_PATH};

/// Aborts page rendering with a redirect, optionally clearing the session cookies.
#[derive(Debug)]
pub struct GuardRejection {
    pub to: &'static str,
    jar: CookieJar,
}

impl GuardRejection {
    fn login(state: &AppState, clear: bool) -> Self {
        let jar = CookieJar::new();
        Self {
            to: LOGIN_PATH,
            jar: if clear { state.sessions.destroy(jar) } else { jar },
        }
    }

    fn landing() -> Self {
        Self {
            to: DEFAULT_LANDING,
            jar: CookieJar::new(),
        }
    }

    pub fn clears_cookies(&self) -> bool {
        self.jar.iter().next().is_some()
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        (self.jar, Redirect::temporary(self.to)).into_response()
    }
}

/// Resolve the caller's session; `None` when absent or untrustworthy.
pub async fn get_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    state.resolver.resolve(&Credentials::from_headers(headers)).await.session()
}

pub async fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<Session, GuardRejection> {
    match state.resolver.resolve(&Credentials::from_headers(headers)).await {
        Resolution::Present(session) => Ok(session),
        Resolution::Absent => Err(GuardRejection::login(state, false)),
        Resolution::Invalid(_) => Err(GuardRejection::login(state, true)),
    }
}

pub async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Session, GuardRejection> {
    let session = require_auth(state, headers).await?;
    if !session.is_admin() {
        tracing::debug!("Guard - principal {} is not an administrator", session.principal.id);
        return Err(GuardRejection::landing());
    }
    Ok(session)
}

/// Extractor for pages that need any authenticated session.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Session);

/// Extractor for administrator-only pages.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_auth(state, &parts.headers).await.map(RequireAuth)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_admin(state, &parts.headers).await.map(RequireAdmin)
    }
}
