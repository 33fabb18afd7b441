//! User administration handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use flexi_core::UserId;

use crate::config::Config;
use crate::display::print_user_summary;

/// User subcommands (admin token required)
#[derive(Subcommand)]
pub enum UserCommands {
    /// List registered users
    List,
    /// Delete a user account
    Delete {
        /// User ID
        id: UserId,
    },
}

/// Handle user commands
pub async fn handle_user_command(command: UserCommands, config: &Config) -> Result<()> {
    let client = config.watcher.client();

    match command {
        UserCommands::List => {
            let users = client.list_users().await.context("Failed to list users")?;

            if users.is_empty() {
                println!("{}", "No users found.".yellow());
            } else {
                println!("{}", format!("Found {} user(s):", users.len()).bold());
                println!();
                for user in &users {
                    print_user_summary(user);
                }
            }
        }
        UserCommands::Delete { id } => {
            if config.user_id == Some(id) {
                anyhow::bail!("Refusing to delete the acting user {}", id);
            }

            client
                .delete_user(id)
                .await
                .context("Failed to delete user")?;

            println!(
                "{}",
                format!("✓ User {} deleted successfully!", id).green().bold()
            );
        }
    }

    Ok(())
}
