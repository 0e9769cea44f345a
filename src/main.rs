use std::sync::Arc;

use console_gate::{
    app, config, identity::StrapiIdentityClient, is_production, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up IDENTITY_API_URL, COOKIE_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting console gate in {:?} mode", config.environment);
    tracing::info!(
        "Identity API at {} ({:?} session validation)",
        config.identity.base_url,
        config.gate.validation
    );
    if is_production!() && config.cookies.domain.is_none() {
        tracing::warn!("COOKIE_DOMAIN is not set; session cookies will be host-only");
    }

    let identity = Arc::new(StrapiIdentityClient::new(&config.identity)?);
    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let router = app(AppState::new(config, identity));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Console gate listening on http://{}", bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}
