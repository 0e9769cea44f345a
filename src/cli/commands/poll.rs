use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use serde_json::json;
use tokio::sync::watch;

use crate::cli::utils::output_success;
use crate::cli::{Context, OutputFormat};
use crate::config::AppConfig;
use crate::middleware::RoutePolicy;
use crate::poller::{PollOutcome, SessionPoller};

#[derive(Subcommand)]
pub enum PollCommands {
    #[command(about = "Run one session check as if the client were on PATH")]
    Check {
        #[arg(help = "Route the client is on")]
        path: String,
    },

    #[command(about = "Walk through a sequence of routes, checking after each change")]
    Watch {
        #[arg(required = true, help = "Routes to visit in order")]
        paths: Vec<String>,
        #[arg(long, default_value_t = 500, help = "Delay between route changes in milliseconds")]
        interval_ms: u64,
    },
}

pub async fn handle(cmd: PollCommands, ctx: &Context, output_format: OutputFormat) -> anyhow::Result<()> {
    // Route classification follows the same environment the gate reads
    let policy = RoutePolicy::new(&AppConfig::from_env().gate);

    match cmd {
        PollCommands::Check { path } => {
            let poller = SessionPoller::new(ctx.client()?, policy);
            let outcome = poller.check(&path).await;
            report(&output_format, &path, &outcome)
        }
        PollCommands::Watch { paths, interval_ms } => {
            let mut routes = paths.into_iter();
            let Some(first) = routes.next() else {
                return Ok(());
            };

            let poller = Arc::new(SessionPoller::new(ctx.client()?, policy));
            let (route_tx, route_rx) = watch::channel(first);
            let mut outcomes = poller.watch(route_rx);

            let feeder = tokio::spawn(async move {
                for path in routes {
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                    if route_tx.send(path).is_err() {
                        break;
                    }
                }
                // Give the last route time to be checked before closing the channel
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            });

            while let Some((path, outcome)) = outcomes.recv().await {
                report(&output_format, &path, &outcome)?;
            }
            feeder.await?;
            Ok(())
        }
    }
}

fn report(output_format: &OutputFormat, path: &str, outcome: &PollOutcome) -> anyhow::Result<()> {
    let message = match outcome {
        PollOutcome::Skipped => format!("{}: allow-listed, not checked", path),
        PollOutcome::Stay => format!("{}: session valid", path),
        PollOutcome::Redirect(to) => format!("{}: redirect to {}", path, to),
        PollOutcome::Cleared { redirect: Some(to) } => format!("{}: no session, redirect to {}", path, to),
        PollOutcome::Cleared { redirect: None } => format!("{}: no session", path),
    };

    output_success(
        output_format,
        &message,
        Some(json!({ "path": path, "redirect": outcome.redirect() })),
    )
}
