use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::identity::{IdentityClient, IdentityError};
use crate::session::cookies::SessionCookies;
use crate::session::Session;

/// Result of a successful credential exchange.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    #[serde(skip)]
    pub session: Session,
    pub redirect: &'static str,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Creates and destroys sessions. Login and logout are the only writers of
/// session state.
#[derive(Clone)]
pub struct SessionService {
    identity: Arc<dyn IdentityClient>,
    cookies: SessionCookies,
    lifetime: Duration,
}

impl SessionService {
    pub fn new(identity: Arc<dyn IdentityClient>, cookies: SessionCookies, lifetime_days: i64) -> Self {
        Self {
            identity,
            cookies,
            lifetime: Duration::days(lifetime_days),
        }
    }

    /// Exchange credentials for a token, then resolve the principal behind it.
    ///
    /// The session is only returned once both steps succeed, so a token is
    /// never persisted without a role-bearing principal.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        let token = self.identity.authenticate(identifier, password).await?;
        let principal = self.identity.me(&token).await?;

        let session = Session::new(token, principal);
        let issued_at = Utc::now();

        tracing::info!(
            "Session created for principal {} ({:?})",
            session.principal.id,
            session.tier()
        );

        Ok(LoginOutcome {
            redirect: session.landing(),
            session,
            issued_at,
            expires_at: issued_at + self.lifetime,
        })
    }

    /// Persist a session into the cookie jar, replacing any previous one.
    pub fn persist(&self, jar: CookieJar, session: &Session) -> CookieJar {
        self.cookies.issue(jar, session)
    }

    pub fn destroy(&self, jar: CookieJar) -> CookieJar {
        self.cookies.clear(jar)
    }
}
