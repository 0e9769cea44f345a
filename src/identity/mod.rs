//! Client seam for the upstream identity API.

pub mod strapi;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::Principal;

pub use strapi::StrapiIdentityClient;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The identity API answered with a non-2xx status. `message` is the
    /// upstream `error.message`, passed through verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("User has no role assigned")]
    MissingRole,

    #[error("Identity API timed out")]
    Timeout,

    #[error("Identity API unreachable: {0}")]
    Transport(String),

    #[error("Unexpected identity API response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IdentityError::Timeout
        } else if err.is_decode() {
            IdentityError::Decode(err.to_string())
        } else {
            IdentityError::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<String, IdentityError>;

    /// Fetch the profile (with role) belonging to a bearer token.
    async fn me(&self, token: &str) -> Result<Principal, IdentityError>;
}
