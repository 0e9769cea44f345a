use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::{Principal, Session};
use crate::config::{CookieConfig, SameSitePolicy};

pub const TOKEN_COOKIE: &str = "token";
pub const USER_COOKIE: &str = "user";

/// Raw transport credentials, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: Option<String>,
    pub principal: Option<String>,
}

impl Credentials {
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self {
            token: non_empty(jar.get(TOKEN_COOKIE).map(|c| c.value().to_string())),
            principal: non_empty(jar.get(USER_COOKIE).map(|c| c.value().to_string())),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_jar(&CookieJar::from_headers(headers))
    }

    /// Fill a missing token from an `Authorization: Bearer` header.
    pub fn with_bearer_fallback(mut self, headers: &HeaderMap) -> Self {
        if self.token.is_none() {
            self.token = bearer_token(headers);
        }
        self
    }

    pub fn is_complete(&self) -> bool {
        self.token.is_some() && self.principal.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.principal.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Builds the `token` / `user` cookie pair with the configured attributes.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    secure: bool,
    same_site: SameSite,
    domain: Option<String>,
    max_age: Duration,
}

impl SessionCookies {
    pub fn new(config: &CookieConfig) -> Self {
        Self {
            secure: config.secure,
            same_site: match config.same_site {
                SameSitePolicy::Lax => SameSite::Lax,
                SameSitePolicy::None => SameSite::None,
            },
            domain: config.domain.clone(),
            max_age: Duration::days(config.max_age_days),
        }
    }

    pub fn token(&self, token: &str) -> Cookie<'static> {
        self.build(TOKEN_COOKIE, token.to_string(), self.max_age)
    }

    pub fn user(&self, principal: &Principal) -> Cookie<'static> {
        self.build(USER_COOKIE, principal.to_cookie_value(), self.max_age)
    }

    /// Add both cookies for a freshly created session.
    pub fn issue(&self, jar: CookieJar, session: &Session) -> CookieJar {
        jar.add(self.token(&session.token))
            .add(self.user(&session.principal))
    }

    /// Expire both cookies.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(TOKEN_COOKIE, String::new(), Duration::ZERO))
            .add(self.build(USER_COOKIE, String::new(), Duration::ZERO))
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .max_age(max_age);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }
}
