use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::session::{resolve_cached, Credentials, Resolution};

/// GET /api/auth/session - session introspection
///
/// Echoes `{user, token}` read from the cookies, or answers 401 with an empty
/// body when either cookie is missing or unparseable. Unparseable cookies are
/// cleared on the way out.
pub async fn session(State(state): State<AppState>, jar: CookieJar) -> Response {
    match resolve_cached(&Credentials::from_jar(&jar)) {
        Resolution::Present(session) => Json(session).into_response(),
        Resolution::Absent => StatusCode::UNAUTHORIZED.into_response(),
        Resolution::Invalid(_) => (state.sessions.destroy(CookieJar::new()), StatusCode::UNAUTHORIZED).into_response(),
    }
}
