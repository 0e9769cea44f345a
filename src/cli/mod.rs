pub mod commands;
pub mod config;
pub mod utils;

use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::poller::GateClient;

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "gatectl - sign in to a console gate and exercise the session poller")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "GATE_URL", default_value = "http://localhost:3000", help = "Gate base URL")]
    pub server: String,

    #[arg(long, global = true, default_value_t = 5, help = "Request timeout in seconds")]
    pub timeout: u64,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Session creation, inspection and logout")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Client-side session checks")]
    Poll {
        #[command(subcommand)]
        cmd: commands::poll::PollCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Connection settings shared by every command.
pub struct Context {
    pub server: String,
    pub timeout: Duration,
}

impl Context {
    /// A gate client seeded with the stored session, if it belongs to this server.
    pub fn client(&self) -> anyhow::Result<GateClient> {
        let client = GateClient::new(&self.server, self.timeout)?;
        if let Some(stored) = config::load_session()? {
            if stored.server == self.server {
                client.seed(&stored.token, &stored.user);
            }
        }
        Ok(client)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = Context {
        server: cli.server.trim_end_matches('/').to_string(),
        timeout: Duration::from_secs(cli.timeout),
    };

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format).await,
        Commands::Poll { cmd } => commands::poll::handle(cmd, &ctx, output_format).await,
    }
}
