use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;

use super::{IdentityClient, IdentityError};
use crate::config::IdentityConfig;
use crate::session::{Principal, PrincipalError};

#[derive(Debug, Serialize)]
struct LocalLogin<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// Identity client for a Strapi users-permissions backend.
#[derive(Debug, Clone)]
pub struct StrapiIdentityClient {
    http: Client,
    base_url: String,
}

impl StrapiIdentityClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into `Rejected`, keeping the upstream message.
async fn rejection(response: Response, fallback: &str) -> IdentityError {
    let status = response.status().as_u16();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| fallback.to_string());

    IdentityError::Rejected { status, message }
}

#[async_trait]
impl IdentityClient for StrapiIdentityClient {
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<String, IdentityError> {
        let response = self
            .http
            .post(self.url("/api/auth/local"))
            .json(&LocalLogin { identifier, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Failed to login").await);
        }

        let body: Value = response.json().await?;
        body.get("jwt")
            .and_then(Value::as_str)
            .filter(|jwt| !jwt.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IdentityError::Decode("login response has no jwt".to_string()))
    }

    async fn me(&self, token: &str) -> Result<Principal, IdentityError> {
        let response = self
            .http
            .get(self.url("/api/users/me"))
            .query(&[("populate[role][populate]", "*")])
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Failed to fetch user data").await);
        }

        let profile: Value = response.json().await?;
        Principal::from_profile(profile).map_err(|e| match e {
            PrincipalError::MissingRole => IdentityError::MissingRole,
            other => IdentityError::Decode(other.to_string()),
        })
    }
}
