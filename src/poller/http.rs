use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;
use reqwest::{cookie::Jar, Client};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use super::SessionSource;
use crate::session::cookies::{TOKEN_COOKIE, USER_COOKIE};
use crate::session::{Principal, Session};

const LOGIN_ENDPOINT: &str = "/api/auth/login";
const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
const SESSION_ENDPOINT: &str = "/api/auth/session";

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("Invalid gate URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Credentialed HTTP client for a running gate, with its own cookie store.
pub struct GateClient {
    http: Client,
    jar: Arc<Jar>,
    base: Url,
}

impl GateClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PollerError> {
        let base = Url::parse(base_url)?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(timeout)
            .build()?;

        Ok(Self { http, jar, base })
    }

    /// Seed the cookie store with an existing session's cookie values.
    pub fn seed(&self, token: &str, user: &str) {
        for (name, value) in [(TOKEN_COOKIE, token), (USER_COOKIE, user)] {
            let cookie = Cookie::new(name, value);
            self.jar
                .add_cookie_str(&format!("{}; Path=/", cookie.encoded()), &self.base);
        }
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<Value, PollerError> {
        let response = self
            .http
            .post(self.base.join(LOGIN_ENDPOINT)?)
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Login failed")
                .to_string();
            return Err(PollerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    pub async fn logout(&self) -> Result<Value, PollerError> {
        let response = self
            .http
            .post(self.base.join(LOGOUT_ENDPOINT)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Ask the introspection endpoint for the current session.
    pub async fn session(&self) -> Result<Option<Session>, PollerError> {
        let response = self.http.get(self.base.join(SESSION_ENDPOINT)?).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        match response.json::<Value>().await {
            Ok(body) => Ok(session_from_body(&body)),
            Err(_) => Ok(None),
        }
    }
}

/// A usable introspection body carries both a token and a parseable user.
fn session_from_body(body: &Value) -> Option<Session> {
    let token = body
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())?;
    let principal = Principal::try_from(body.get("user")?.clone()).ok()?;
    Some(Session::new(token, principal))
}

#[async_trait]
impl SessionSource for GateClient {
    async fn introspect(&self) -> Option<Session> {
        match self.session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Session introspection failed: {}", e);
                None
            }
        }
    }
}
