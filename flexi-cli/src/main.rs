//! Flexi CLI
//!
//! Command-line interface for the FlexiFaaS backend: upload functions, run
//! them and follow them to completion, browse execution logs and manage
//! users.

mod commands;
mod config;
mod display;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use flexi_core::UserId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flexi")]
#[command(about = "FlexiFaaS command-line client", long_about = None)]
struct Cli {
    /// Backend URL [env: FLEXI_BACKEND_URL]
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Bearer token from the auth middleware [env: FLEXI_TOKEN]
    #[arg(long, global = true)]
    token: Option<String>,

    /// User to act as
    #[arg(long, global = true, env = "FLEXI_USER_ID")]
    user_id: Option<UserId>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flexi_cli=info,flexi_watcher=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.backend_url, cli.token, cli.user_id)?;

    handle_command(cli.command, &config).await
}
