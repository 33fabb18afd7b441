//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod exec;
mod functions;
mod logs;
mod users;

pub use exec::ExecArgs;
pub use functions::FunctionCommands;
pub use logs::LogCommands;
pub use users::UserCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Execute a function and follow it to completion
    Exec(ExecArgs),
    /// Execution history
    Logs {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Uploaded functions
    Functions {
        #[command(subcommand)]
        command: FunctionCommands,
    },
    /// Registered users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Exec(args) => exec::handle_exec(args, config).await,
        Commands::Logs { command } => logs::handle_log_command(command, config).await,
        Commands::Functions { command } => {
            functions::handle_function_command(command, config).await
        }
        Commands::Users { command } => users::handle_user_command(command, config).await,
    }
}
