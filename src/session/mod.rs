//! Session data model shared by the edge filter, the page guards and the poller.
//!
//! A [`Session`] is either fully present (token plus a role-bearing
//! [`Principal`]) or absent. Role normalization happens once, while the
//! principal is parsed; everything downstream branches on [`Tier`].

pub mod cookies;
pub mod resolver;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub use cookies::Credentials;
pub use resolver::{resolve_cached, Resolution, SessionResolver};

/// Where unauthenticated callers are sent.
pub const LOGIN_PATH: &str = "/login";
/// Landing page for administrators.
pub const ADMIN_LANDING: &str = "/admin-dashboard";
/// Landing page for everyone else.
pub const DEFAULT_LANDING: &str = "/dashboard";

const ADMINISTRATOR: &str = "administrator";

/// Authorization tier derived from the principal's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Administrator,
    Standard,
}

impl Tier {
    pub fn landing(&self) -> &'static str {
        match self {
            Tier::Administrator => ADMIN_LANDING,
            Tier::Standard => DEFAULT_LANDING,
        }
    }
}

/// Collective gate state for one user-agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    Authenticated(Tier),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("principal is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("principal must be a JSON object")]
    NotAnObject,

    #[error("principal has no id")]
    MissingId,

    #[error("User has no role assigned")]
    MissingRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrincipalId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalId::Numeric(id) => write!(f, "{}", id),
            PrincipalId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// Role as written into the principal cookie: `{name, type}`.
///
/// `kind` is the normalized lowercase type. When the upstream role carries no
/// `type` (or the role is a bare display-name string from older cookies), the
/// lowercased display name stands in for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Role {
    pub fn new(name: impl Into<String>, kind: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            kind: kind.as_ref().trim().to_ascii_lowercase(),
        }
    }

    pub fn tier(&self) -> Tier {
        if self.kind == ADMINISTRATOR {
            Tier::Administrator
        } else {
            Tier::Standard
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) if !name.trim().is_empty() => Some(Role::new(name.clone(), name)),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str).unwrap_or_default();
                let kind = map
                    .get("type")
                    .and_then(Value::as_str)
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(name);
                if kind.trim().is_empty() {
                    None
                } else {
                    Some(Role::new(name, kind))
                }
            }
            _ => None,
        }
    }
}

/// The authenticated user's identity, as needed for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub role: Role,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl Principal {
    /// Parse the `user` cookie value.
    pub fn from_cookie(raw: &str) -> Result<Self, PrincipalError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| PrincipalError::InvalidJson(e.to_string()))?;
        Self::try_from(value)
    }

    /// Parse a profile returned by the identity API (`/users/me`).
    pub fn from_profile(profile: Value) -> Result<Self, PrincipalError> {
        Self::try_from(profile)
    }

    pub fn tier(&self) -> Tier {
        self.role.tier()
    }

    pub fn to_cookie_value(&self) -> String {
        // Serializing plain strings and integers cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl TryFrom<Value> for Principal {
    type Error = PrincipalError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let map = value.as_object().ok_or(PrincipalError::NotAnObject)?;

        let id = match map.get("id") {
            Some(Value::Number(n)) => n.as_u64().map(PrincipalId::Numeric),
            Some(Value::String(s)) if !s.is_empty() => Some(PrincipalId::Text(s.clone())),
            _ => None,
        }
        .ok_or(PrincipalError::MissingId)?;

        let role = map
            .get("role")
            .and_then(Role::from_value)
            .ok_or(PrincipalError::MissingRole)?;

        let email = map
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let display_name = ["name", "displayName", "username"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .unwrap_or(&email)
            .to_string();

        Ok(Self {
            id,
            email,
            role,
            display_name,
        })
    }
}

/// A complete session: bearer token and its resolved principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    #[serde(rename = "user")]
    pub principal: Principal,
}

impl Session {
    pub fn new(token: impl Into<String>, principal: Principal) -> Self {
        Self {
            token: token.into(),
            principal,
        }
    }

    pub fn tier(&self) -> Tier {
        self.principal.tier()
    }

    pub fn is_admin(&self) -> bool {
        self.tier() == Tier::Administrator
    }

    pub fn landing(&self) -> &'static str {
        self.tier().landing()
    }

    pub fn state(&self) -> GateState {
        GateState::Authenticated(self.tier())
    }
}
