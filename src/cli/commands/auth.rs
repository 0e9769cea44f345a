use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{self, StoredSession};
use crate::cli::utils::{output_error, output_success};
use crate::cli::{Context, OutputFormat};
use crate::poller::PollerError;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session cookies")]
    Login {
        #[arg(help = "Email or username")]
        identifier: String,
        #[arg(long, env = "GATECTL_PASSWORD", help = "Password")]
        password: String,
    },

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show what the session introspection endpoint reports")]
    Session,
}

pub async fn handle(cmd: AuthCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { identifier, password } => {
            let client = ctx.client()?;
            match client.login(&identifier, &password).await {
                Ok(body) => {
                    // The login response carries the user; the token only lives in the cookie
                    let session = client
                        .session()
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Login succeeded but no session cookie was set"))?;

                    config::save_session(&StoredSession::new(
                        ctx.server.clone(),
                        session.token.clone(),
                        session.principal.to_cookie_value(),
                    ))?;

                    output_success(
                        &output_format,
                        &format!("Signed in as {} ({:?})", session.principal.display_name, session.tier()),
                        Some(json!({ "redirect": body["redirect"], "user": session.principal })),
                    )
                }
                Err(PollerError::Rejected { status, message }) => {
                    output_error(&output_format, &message, Some(&status.to_string()))?;
                    anyhow::bail!("login rejected")
                }
                Err(e) => Err(e.into()),
            }
        }
        AuthCommands::Logout => {
            let client = ctx.client()?;
            let body = client.logout().await?;
            config::clear_session()?;
            output_success(&output_format, "Signed out", Some(json!({ "redirect": body["redirect"] })))
        }
        AuthCommands::Session => {
            let client = ctx.client()?;
            match client.session().await? {
                Some(session) => output_success(
                    &output_format,
                    &format!("Session active for {} ({:?})", session.principal.display_name, session.tier()),
                    Some(json!({ "user": session.principal, "landing": session.landing() })),
                ),
                None => {
                    output_error(&output_format, "No valid session", Some("401"))?;
                    anyhow::bail!("no valid session")
                }
            }
        }
    }
}
