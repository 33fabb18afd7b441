//! Log command handlers
//!
//! Execution history: per function, per user, or everything.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use flexi_core::domain::execution::ExecutionRecord;
use flexi_core::{FunctionId, UserId};

use crate::config::Config;
use crate::display::{print_record_summary, sort_newest_first};

/// Log subcommands
#[derive(Subcommand)]
pub enum LogCommands {
    /// Executions of one function
    Function {
        /// Function ID
        id: FunctionId,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Executions started by a user (defaults to the acting user)
    User {
        /// User ID
        id: Option<UserId>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Every execution (admin)
    All {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle log commands
pub async fn handle_log_command(command: LogCommands, config: &Config) -> Result<()> {
    let client = config.watcher.client();

    let (records, label, json) = match command {
        LogCommands::Function { id, json } => (
            client
                .function_logs(id)
                .await
                .context("Failed to fetch function logs")?,
            format!("function {}", id),
            json,
        ),
        LogCommands::User { id, json } => {
            let id = match id {
                Some(id) => id,
                None => config.require_user()?,
            };
            (
                client
                    .user_logs(id)
                    .await
                    .context("Failed to fetch user logs")?,
                format!("user {}", id),
                json,
            )
        }
        LogCommands::All { json } => (
            client.all_logs().await.context("Failed to fetch logs")?,
            "all functions".to_string(),
            json,
        ),
    };

    print_records(records, &label, json)
}

fn print_records(mut records: Vec<ExecutionRecord>, label: &str, json: bool) -> Result<()> {
    sort_newest_first(&mut records);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", format!("No executions found for {}.", label).yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} execution(s) for {}:", records.len(), label).bold()
    );
    println!();
    for record in &records {
        print_record_summary(record);
    }

    Ok(())
}
