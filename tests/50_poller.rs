mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{response::Json, Router};
use serde_json::json;
use tokio::sync::watch;

use console_gate::app;
use console_gate::config::AppConfig;
use console_gate::middleware::RoutePolicy;
use console_gate::poller::{GateClient, PollOutcome, PollerError, SessionPoller};
use console_gate::session::{Principal, Session};
use common::*;

async fn running_gate(identity: &FakeIdentity) -> Result<String> {
    let (state, _) = gate(identity);
    serve(app(state)).await
}

fn policy() -> RoutePolicy {
    RoutePolicy::new(&AppConfig::development().gate)
}

#[tokio::test]
async fn client_login_session_logout() -> Result<()> {
    let identity = FakeIdentity::new();
    let client = GateClient::new(&running_gate(&identity).await?, Duration::from_secs(5))?;

    assert!(client.session().await?.is_none());

    let body = client.login(EMPLOYEE_EMAIL, PASSWORD).await?;
    assert_eq!(body["redirect"], "/dashboard");

    let session = client.session().await?.expect("session after login");
    assert_eq!(session.token, EMPLOYEE_TOKEN);
    assert!(!session.is_admin());

    client.logout().await?;
    assert!(client.session().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn client_login_rejection_carries_message() -> Result<()> {
    let identity = FakeIdentity::new();
    let client = GateClient::new(&running_gate(&identity).await?, Duration::from_secs(5))?;

    match client.login(ADMIN_EMAIL, "wrong").await {
        Err(PollerError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid identifier or password");
        }
        other => panic!("unexpected login result: {:?}", other.map(|_| ())),
    }
    assert!(client.session().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn seeded_client_reuses_existing_session() -> Result<()> {
    let identity = FakeIdentity::new();
    let client = GateClient::new(&running_gate(&identity).await?, Duration::from_secs(5))?;

    client.seed(ADMIN_TOKEN, &admin_cookie());

    let session = client.session().await?.expect("seeded session");
    assert!(session.is_admin());
    assert_eq!(session.landing(), "/admin-dashboard");
    Ok(())
}

#[tokio::test]
async fn poller_follows_session_lifecycle() -> Result<()> {
    let identity = FakeIdentity::new();
    let client = Arc::new(GateClient::new(&running_gate(&identity).await?, Duration::from_secs(5))?);
    let poller = SessionPoller::new(client.clone(), policy());

    assert_eq!(
        poller.check("/dashboard").await,
        PollOutcome::Cleared { redirect: Some("/login") }
    );
    assert_eq!(poller.check("/login").await, PollOutcome::Cleared { redirect: None });

    client.login(EMPLOYEE_EMAIL, PASSWORD).await?;

    assert_eq!(poller.check("/dashboard").await, PollOutcome::Stay);
    assert_eq!(poller.cache().get().await.map(|s| s.token), Some(EMPLOYEE_TOKEN.to_string()));
    assert_eq!(poller.check("/admin-dashboard").await, PollOutcome::Redirect("/dashboard"));
    assert_eq!(poller.check("/login").await, PollOutcome::Redirect("/dashboard"));
    assert_eq!(poller.check("/health").await, PollOutcome::Skipped);

    client.logout().await?;

    assert_eq!(
        poller.check("/dashboard").await,
        PollOutcome::Cleared { redirect: Some("/login") }
    );
    assert!(poller.cache().get().await.is_none());
    Ok(())
}

#[tokio::test]
async fn poller_rechecks_on_route_change() -> Result<()> {
    let identity = FakeIdentity::new();
    let client = Arc::new(GateClient::new(&running_gate(&identity).await?, Duration::from_secs(5))?);
    client.login(ADMIN_EMAIL, PASSWORD).await?;

    let poller = Arc::new(SessionPoller::new(client.clone(), policy()));
    let (routes, rx) = watch::channel("/login".to_string());
    let mut outcomes = poller.watch(rx);

    let (path, outcome) = outcomes.recv().await.expect("mount check");
    assert_eq!(path, "/login");
    assert_eq!(outcome, PollOutcome::Redirect("/admin-dashboard"));

    routes.send("/admin-dashboard".to_string())?;
    let (path, outcome) = outcomes.recv().await.expect("route change check");
    assert_eq!(path, "/admin-dashboard");
    assert_eq!(outcome, PollOutcome::Stay);

    drop(routes);
    assert!(outcomes.recv().await.is_none());
    Ok(())
}

#[tokio::test]
async fn unreachable_gate_means_no_session() -> Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = GateClient::new(&format!("http://{}", addr), Duration::from_secs(2))?;
    let poller = SessionPoller::new(client, policy());

    assert_eq!(
        poller.check("/dashboard").await,
        PollOutcome::Cleared { redirect: Some("/login") }
    );
    Ok(())
}

#[tokio::test]
async fn slow_introspection_means_no_session() -> Result<()> {
    let router = Router::new().route(
        "/api/auth/session",
        axum::routing::get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({
                "token": EMPLOYEE_TOKEN,
                "user": { "id": 2, "email": EMPLOYEE_EMAIL, "role": { "name": "Employee", "type": "employee" } }
            }))
        }),
    );
    let client = GateClient::new(&serve(router).await?, Duration::from_secs(1))?;

    assert!(matches!(client.session().await, Err(PollerError::Http(_))));

    let poller = SessionPoller::new(client, policy());
    let cached = Session::new(EMPLOYEE_TOKEN, Principal::from_cookie(&employee_cookie())?);
    poller.cache().store(cached).await;

    assert_eq!(
        poller.check("/dashboard").await,
        PollOutcome::Cleared { redirect: Some("/login") }
    );
    assert!(poller.cache().get().await.is_none());
    Ok(())
}
