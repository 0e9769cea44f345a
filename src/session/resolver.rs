use std::sync::Arc;

use super::{Credentials, GateState, Principal, Session};
use crate::config::ValidationPolicy;
use crate::identity::{IdentityClient, IdentityError};

/// Outcome of resolving transport credentials into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No credentials (or only half of them) were presented.
    Absent,
    /// Credentials were presented but cannot be trusted; they must be cleared.
    Invalid(String),
    Present(Session),
}

impl Resolution {
    pub fn session(self) -> Option<Session> {
        match self {
            Resolution::Present(session) => Some(session),
            _ => None,
        }
    }

    pub fn should_clear(&self) -> bool {
        matches!(self, Resolution::Invalid(_))
    }

    pub fn state(&self) -> GateState {
        match self {
            Resolution::Present(session) => session.state(),
            _ => GateState::Unauthenticated,
        }
    }
}

/// Resolve a session from cookies alone. Never touches the network.
pub fn resolve_cached(credentials: &Credentials) -> Resolution {
    let (Some(token), Some(raw)) = (&credentials.token, &credentials.principal) else {
        return Resolution::Absent;
    };

    match Principal::from_cookie(raw) {
        Ok(principal) => Resolution::Present(Session::new(token.clone(), principal)),
        Err(e) => {
            tracing::warn!("Discarding malformed principal cookie: {}", e);
            Resolution::Invalid(e.to_string())
        }
    }
}

/// Server-side session resolution, honoring the configured validation policy.
#[derive(Clone)]
pub struct SessionResolver {
    policy: ValidationPolicy,
    identity: Arc<dyn IdentityClient>,
}

impl SessionResolver {
    pub fn new(policy: ValidationPolicy, identity: Arc<dyn IdentityClient>) -> Self {
        Self { policy, identity }
    }

    pub async fn resolve(&self, credentials: &Credentials) -> Resolution {
        let cached = resolve_cached(credentials);

        let session = match (self.policy, cached) {
            (ValidationPolicy::Live, Resolution::Present(session)) => session,
            (_, resolution) => return resolution,
        };

        match self.identity.me(&session.token).await {
            Ok(principal) => Resolution::Present(Session::new(session.token, principal)),
            Err(IdentityError::Rejected { status, message }) => {
                tracing::info!("Identity API rejected session token ({}): {}", status, message);
                Resolution::Invalid(message)
            }
            Err(IdentityError::MissingRole) => Resolution::Invalid(IdentityError::MissingRole.to_string()),
            Err(e) => {
                // Unreachable identity API: fail closed without destroying the cookies
                tracing::warn!("Live session validation failed: {}", e);
                Resolution::Absent
            }
        }
    }
}
