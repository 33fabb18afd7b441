//! Function command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use flexi_core::dto::function::UploadFunction;
use flexi_core::{FunctionId, UserId};

use crate::config::Config;
use crate::display::{format_time, print_function_summary};

/// Function subcommands
#[derive(Subcommand)]
pub enum FunctionCommands {
    /// List uploaded functions
    List {
        /// Only functions owned by this user
        #[arg(long)]
        owner: Option<UserId>,

        /// Only functions owned by the acting user
        #[arg(long, conflicts_with = "owner")]
        mine: bool,
    },
    /// Get function details
    Get {
        /// Function ID
        id: FunctionId,
    },
    /// Upload a source file as a new function
    Upload {
        /// Path to the source file
        file: PathBuf,

        /// Function name (defaults to the file name without extension)
        #[arg(short, long)]
        name: Option<String>,

        /// Runtime (python, js or java; guessed from the extension)
        #[arg(short, long)]
        runtime: Option<String>,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a function
    Delete {
        /// Function ID
        id: FunctionId,
    },
}

/// Handle function commands
pub async fn handle_function_command(command: FunctionCommands, config: &Config) -> Result<()> {
    let client = config.watcher.client();

    match command {
        FunctionCommands::List { owner, mine } => {
            let owner = if mine {
                Some(config.require_user()?)
            } else {
                owner
            };

            let functions = match owner {
                Some(user_id) => client.user_functions(user_id).await,
                None => client.list_functions().await,
            }
            .context("Failed to list functions")?;

            if functions.is_empty() {
                println!("{}", "No functions found.".yellow());
            } else {
                println!(
                    "{}",
                    format!("Found {} function(s):", functions.len()).bold()
                );
                println!();
                for function in &functions {
                    print_function_summary(function);
                }
            }
        }
        FunctionCommands::Get { id } => {
            let function = client
                .get_function(id)
                .await
                .context("Failed to fetch function")?;

            println!("{}", "Function Details:".bold());
            println!("  ID:          {}", function.id.to_string().cyan());
            println!("  Name:        {}", function.name);
            if let Some(runtime) = &function.runtime {
                println!("  Runtime:     {}", runtime);
            }
            if let Some(version) = function.version {
                println!("  Version:     {}", version);
            }
            if let Some(status) = &function.status {
                println!("  Status:      {}", status);
            }
            if let Some(owner) = function.owner_id {
                println!("  Owner:       {}", owner);
            }
            println!("  Uploaded:    {}", format_time(function.upload_time));
            println!("  Modified:    {}", format_time(function.last_modified));
            if let Some(description) = &function.description {
                println!("\n{}", "Description:".bold());
                println!("{}", description);
            }
        }
        FunctionCommands::Upload {
            file,
            name,
            runtime,
            description,
        } => {
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read source file: {}", file.display()))?;

            let upload = UploadFunction {
                code,
                name: match name {
                    Some(name) => name,
                    None => name_from_path(&file)?,
                },
                runtime: match runtime {
                    Some(runtime) => runtime,
                    None => runtime_from_path(&file)?,
                },
                description,
                user_id: config.require_user()?,
            };

            let function = client
                .upload_function_text(&upload)
                .await
                .context("Failed to upload function")?;

            println!("{}", "✓ Function uploaded successfully!".green().bold());
            println!("  ID:      {}", function.id.to_string().cyan());
            println!("  Name:    {}", function.name.bold());
            if let Some(runtime) = &function.runtime {
                println!("  Runtime: {}", runtime.dimmed());
            }
            println!();
            println!(
                "Run it with: {}",
                format!("flexi exec {} --payload <input>", function.id).cyan()
            );
        }
        FunctionCommands::Delete { id } => {
            client
                .delete_function(id)
                .await
                .context("Failed to delete function")?;

            println!(
                "{}",
                format!("✓ Function {} deleted successfully!", id)
                    .green()
                    .bold()
            );
        }
    }

    Ok(())
}

fn name_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a function name from {}", path.display()))
}

fn runtime_from_path(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(UploadFunction::runtime_for_extension)
        .map(str::to_string)
        .with_context(|| {
            format!(
                "Cannot guess the runtime of {}; pass --runtime",
                path.display()
            )
        })
}
