//! Client-side session poller.
//!
//! After a page has rendered, the poller re-confirms the session against the
//! introspection endpoint and reports the corrective navigation, if any. It
//! never blocks rendering; a redirect always happens after the fact.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, RwLock};

use crate::middleware::RoutePolicy;
use crate::session::{Session, DEFAULT_LANDING, LOGIN_PATH};

pub use http::{GateClient, PollerError};

/// Source of truth the poller checks against.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// `None` for any failure: non-2xx, unreadable body, network error or timeout.
    async fn introspect(&self) -> Option<Session>;
}

#[async_trait]
impl<T: SessionSource + ?Sized> SessionSource for Arc<T> {
    async fn introspect(&self) -> Option<Session> {
        (**self).introspect().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Allow-listed route; nothing was checked.
    Skipped,
    Stay,
    Redirect(&'static str),
    /// The session is gone. Local credentials were dropped; `redirect` is
    /// `None` when the caller is already on the login page.
    Cleared { redirect: Option<&'static str> },
}

impl PollOutcome {
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            PollOutcome::Redirect(to) => Some(*to),
            PollOutcome::Cleared { redirect } => *redirect,
            _ => None,
        }
    }
}

/// The login page is checked even though it is allow-listed, so that an
/// authenticated user landing on it can be sent forward.
pub fn should_poll(policy: &RoutePolicy, path: &str) -> bool {
    policy.is_login(path) || !policy.is_public(path)
}

pub fn poll_decision(policy: &RoutePolicy, path: &str, session: Option<&Session>) -> PollOutcome {
    match session {
        None => PollOutcome::Cleared {
            redirect: if policy.is_login(path) { None } else { Some(LOGIN_PATH) },
        },
        Some(session) if policy.is_login(path) => PollOutcome::Redirect(session.landing()),
        Some(session) if policy.is_admin(path) && !session.is_admin() => {
            PollOutcome::Redirect(DEFAULT_LANDING)
        }
        Some(_) => PollOutcome::Stay,
    }
}

/// Locally cached credentials on the client side.
#[derive(Debug, Clone, Default)]
pub struct CredentialCache {
    inner: Arc<RwLock<Option<Session>>>,
}

impl CredentialCache {
    pub async fn get(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    pub async fn store(&self, session: Session) {
        *self.inner.write().await = Some(session);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

pub struct SessionPoller<S> {
    source: S,
    policy: RoutePolicy,
    cache: CredentialCache,
}

impl<S: SessionSource + 'static> SessionPoller<S> {
    pub fn new(source: S, policy: RoutePolicy) -> Self {
        Self {
            source,
            policy,
            cache: CredentialCache::default(),
        }
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// Run one check for the route the client is currently on.
    pub async fn check(&self, path: &str) -> PollOutcome {
        if !should_poll(&self.policy, path) {
            return PollOutcome::Skipped;
        }

        let session = self.source.introspect().await;
        match &session {
            Some(session) => self.cache.store(session.clone()).await,
            None => self.cache.clear().await,
        }

        let outcome = poll_decision(&self.policy, path, session.as_ref());
        if let Some(to) = outcome.redirect() {
            tracing::debug!("Poller - {} -> {}", path, to);
        }
        outcome
    }

    /// Check on mount and again on every route change.
    ///
    /// The current value of `routes` is checked immediately. The task ends when
    /// the route sender or the outcome receiver is dropped.
    pub fn watch(self: Arc<Self>, mut routes: watch::Receiver<String>) -> mpsc::Receiver<(String, PollOutcome)> {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            loop {
                let path = routes.borrow_and_update().clone();
                let outcome = self.check(&path).await;
                if tx.send((path, outcome)).await.is_err() {
                    break;
                }
                if routes.changed().await.is_err() {
                    break;
                }
            }
        });

        rx
    }
}
