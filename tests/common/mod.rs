#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request, Response},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use console_gate::config::AppConfig;
use console_gate::identity::{IdentityClient, IdentityError};
use console_gate::session::{Principal, PrincipalError};
use console_gate::{app, AppState};

pub const ADMIN_EMAIL: &str = "admin@x.com";
pub const EMPLOYEE_EMAIL: &str = "employee@x.com";
pub const PASSWORD: &str = "s3cret";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const EMPLOYEE_TOKEN: &str = "employee-token";

struct Account {
    password: String,
    token: String,
    profile: Value,
}

/// In-memory identity API with two accounts: an administrator and an employee.
#[derive(Clone)]
pub struct FakeIdentity {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    me_calls: Arc<AtomicUsize>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        let identity = Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            me_calls: Arc::new(AtomicUsize::new(0)),
        };
        identity.add(
            ADMIN_EMAIL,
            ADMIN_TOKEN,
            json!({
                "id": 1,
                "email": ADMIN_EMAIL,
                "username": "admin",
                "role": { "id": 3, "name": "Administrator", "type": "administrator" }
            }),
        );
        identity.add(
            EMPLOYEE_EMAIL,
            EMPLOYEE_TOKEN,
            json!({
                "id": 2,
                "email": EMPLOYEE_EMAIL,
                "username": "employee",
                "role": { "id": 4, "name": "Employee", "type": "employee" }
            }),
        );
        identity
    }

    pub fn add(&self, identifier: &str, token: &str, profile: Value) {
        self.accounts.lock().unwrap().insert(
            identifier.to_string(),
            Account {
                password: PASSWORD.to_string(),
                token: token.to_string(),
                profile,
            },
        );
    }

    /// Replace the profile behind an account, as an upstream role change would.
    pub fn set_profile(&self, identifier: &str, profile: Value) {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(identifier) {
            account.profile = profile;
        }
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityClient for FakeIdentity {
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<String, IdentityError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(identifier) {
            Some(account) if account.password == password => Ok(account.token.clone()),
            _ => Err(IdentityError::Rejected {
                status: 400,
                message: "Invalid identifier or password".to_string(),
            }),
        }
    }

    async fn me(&self, token: &str) -> Result<Principal, IdentityError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        let profile = {
            let accounts = self.accounts.lock().unwrap();
            accounts
                .values()
                .find(|account| account.token == token)
                .map(|account| account.profile.clone())
        };

        let profile = profile.ok_or_else(|| IdentityError::Rejected {
            status: 401,
            message: "Invalid token".to_string(),
        })?;

        Principal::from_profile(profile).map_err(|e| match e {
            PrincipalError::MissingRole => IdentityError::MissingRole,
            other => IdentityError::Decode(other.to_string()),
        })
    }
}

pub fn state_with(config: AppConfig, identity: &FakeIdentity) -> AppState {
    AppState::new(config, Arc::new(identity.clone()))
}

pub fn gate(identity: &FakeIdentity) -> (AppState, Router) {
    let state = state_with(AppConfig::development(), identity);
    (state.clone(), app(state))
}

/// The `user` cookie value the gate would write for a profile.
pub fn user_cookie(profile: Value) -> String {
    Principal::from_profile(profile).unwrap().to_cookie_value()
}

pub fn admin_cookie() -> String {
    user_cookie(json!({
        "id": 1,
        "email": ADMIN_EMAIL,
        "username": "admin",
        "role": { "name": "Administrator", "type": "administrator" }
    }))
}

pub fn employee_cookie() -> String {
    user_cookie(json!({
        "id": 2,
        "email": EMPLOYEE_EMAIL,
        "username": "employee",
        "role": { "name": "Employee", "type": "employee" }
    }))
}

/// A `Cookie` request header carrying both session cookies.
pub fn cookie_header(token: &str, user: &str) -> String {
    format!(
        "{}; {}",
        Cookie::new("token", token).encoded(),
        Cookie::new("user", user).encoded()
    )
}

pub fn headers_with_cookies(token: &str, user: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(&cookie_header(token, user)).unwrap());
    headers
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn get_with_cookies(path: &str, token: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::COOKIE, cookie_header(token, user))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_form(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(header::LOCATION)?.to_str().ok()
}

/// All `Set-Cookie` headers, decoded.
pub fn set_cookies(response: &Response<Body>) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse_encoded(v.to_string()).ok())
        .collect()
}

pub fn set_cookie<'a>(cookies: &'a [Cookie<'static>], name: &str) -> Option<&'a Cookie<'static>> {
    cookies.iter().find(|c| c.name() == name)
}

pub async fn body_bytes(response: Response<Body>) -> Result<Vec<u8>> {
    Ok(axum::body::to_bytes(response.into_body(), usize::MAX).await?.to_vec())
}

pub async fn body_json(response: Response<Body>) -> Result<Value> {
    Ok(serde_json::from_slice(&body_bytes(response).await?)?)
}

/// Serve a router on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}
