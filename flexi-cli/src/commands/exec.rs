//! Execute command handler
//!
//! Submits a function execution and follows it until it finishes, fails,
//! or the user presses Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use flexi_core::FunctionId;
use flexi_core::poll::{DisplayStatus, Notification, PollSession};
use flexi_watcher::{ExecutionView, ExecutionWatcher, Notifier};

use crate::config::Config;
use crate::display::{colorize_display_status, format_elapsed, print_notification};

/// Arguments of `flexi exec`
#[derive(Args)]
pub struct ExecArgs {
    /// Function ID
    function_id: FunctionId,

    /// Input passed to the function (whitespace-separated arguments)
    #[arg(short, long, default_value = "")]
    payload: String,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Give up after this many consecutive failed polls (0 = never)
    #[arg(long)]
    max_errors: Option<u32>,

    /// Give up after this many seconds without a result (0 = never)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

/// Prints notifications to stderr
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        print_notification(notification);
    }
}

/// Handle `flexi exec`
pub async fn handle_exec(args: ExecArgs, config: &Config) -> Result<()> {
    let user_id = config.require_user()?;

    let mut settings = config.watcher.clone();
    if let Some(ms) = args.interval_ms {
        settings.poll_interval = Duration::from_millis(ms);
    }
    if let Some(max) = args.max_errors {
        settings.max_consecutive_errors = (max > 0).then_some(max);
    }
    if let Some(secs) = args.timeout_secs {
        settings.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    settings.validate()?;

    let watcher = ExecutionWatcher::new(
        Arc::new(settings.client()),
        Arc::new(ConsoleNotifier),
        settings.policy(),
    );
    let mut view = ExecutionView::new(watcher, args.function_id, user_id);

    println!(
        "{}",
        format!(
            "Executing function {} as user {}",
            args.function_id, user_id
        )
        .bold()
    );

    let mut updates = view
        .execute(args.payload)
        .context("Cannot start execution")?
        .subscribe();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut shown = DisplayStatus::Idle;

    loop {
        let status = updates.borrow_and_update().status();
        if status != shown {
            println!("  {} {}", "▸".cyan(), colorize_display_status(status));
            shown = status;
        }
        if status.is_terminal() {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                view.cancel();
            }
        }
    }

    let session = match view.take() {
        Some(handle) => handle.join().await,
        None => view.session(),
    };
    print_result(&session);

    if session.status() != DisplayStatus::Success {
        anyhow::bail!(
            "Execution did not succeed: {}",
            session.error_message().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Print the final state of a session
fn print_result(session: &PollSession) {
    println!();
    println!("{}", "Result:".bold());
    println!("  Status:  {}", colorize_display_status(session.status()));
    println!("  Elapsed: {}", format_elapsed(session.elapsed()));

    let output = session.output().trim_end();
    if !output.is_empty() {
        println!("\n{}", "Output:".bold());
        println!("{}", output);
    }

    if let Some(error) = session.error_message() {
        println!("\n{}", "Error:".bold());
        println!("{}", error.trim_end().red());
    }
}
