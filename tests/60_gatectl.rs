mod common;

use std::time::Duration;

use anyhow::Result;

use console_gate::app;
use console_gate::cli::commands::auth::{handle, AuthCommands};
use console_gate::cli::{config, Context, OutputFormat};
use common::*;

#[tokio::test]
async fn auth_commands_track_the_stored_session() -> Result<()> {
    let config_dir = std::env::temp_dir().join(format!("gatectl-test-{}", std::process::id()));
    std::env::set_var("GATECTL_CONFIG_DIR", &config_dir);

    let identity = FakeIdentity::new();
    let (state, _) = gate(&identity);
    let ctx = Context {
        server: serve(app(state)).await?,
        timeout: Duration::from_secs(5),
    };

    // No session yet: the command reports it and fails
    assert!(handle(AuthCommands::Session, &ctx, OutputFormat::Json).await.is_err());

    let rejected = handle(
        AuthCommands::Login {
            identifier: ADMIN_EMAIL.to_string(),
            password: "wrong".to_string(),
        },
        &ctx,
        OutputFormat::Json,
    )
    .await;
    assert!(rejected.is_err());
    assert!(config::load_session()?.is_none());

    handle(
        AuthCommands::Login {
            identifier: ADMIN_EMAIL.to_string(),
            password: PASSWORD.to_string(),
        },
        &ctx,
        OutputFormat::Json,
    )
    .await?;
    let stored = config::load_session()?.expect("stored session");
    assert_eq!(stored.token, ADMIN_TOKEN);
    assert_eq!(stored.server, ctx.server);

    // A fresh invocation picks the stored cookies back up
    handle(AuthCommands::Session, &ctx, OutputFormat::Json).await?;

    handle(AuthCommands::Logout, &ctx, OutputFormat::Json).await?;
    assert!(config::load_session()?.is_none());
    assert!(handle(AuthCommands::Session, &ctx, OutputFormat::Json).await.is_err());

    let _ = std::fs::remove_dir_all(&config_dir);
    Ok(())
}
