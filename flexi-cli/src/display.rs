//! Terminal rendering shared by the command handlers

use chrono::{DateTime, Utc};
use colored::*;
use flexi_core::domain::execution::{ExecutionRecord, RecordStatus};
use flexi_core::domain::function::FunctionSummary;
use flexi_core::domain::user::UserSummary;
use flexi_core::poll::{DisplayStatus, Notification, NotificationKind};
use std::time::Duration;

/// Colorize a backend status for display
pub fn colorize_record_status(status: Option<RecordStatus>) -> ColoredString {
    let Some(status) = status else {
        return "-".dimmed();
    };
    let text = status.to_string();
    match status {
        RecordStatus::Queued => text.yellow(),
        RecordStatus::Running => text.cyan(),
        RecordStatus::Success => text.green(),
        RecordStatus::Failed | RecordStatus::Error => text.red(),
        RecordStatus::Unknown => text.dimmed(),
    }
}

/// Colorize a session status for display
pub fn colorize_display_status(status: DisplayStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        DisplayStatus::Idle => text.dimmed(),
        DisplayStatus::Queued => text.yellow(),
        DisplayStatus::Running => text.cyan(),
        DisplayStatus::Success => text.green(),
        DisplayStatus::Failed => text.red(),
    }
}

pub fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Seconds with two decimals, e.g. "1.50s"
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Print an execution record summary
pub fn print_record_summary(record: &ExecutionRecord) {
    let id = record
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".to_string());

    println!(
        "  {} Execution {}  {}",
        "▸".cyan(),
        id.dimmed(),
        colorize_record_status(record.status)
    );
    println!(
        "    Function: {}   User: {}",
        opt_id(record.function_id).dimmed(),
        opt_id(record.user_id).dimmed()
    );
    println!("    At:       {}", format_time(record.execution_time).dimmed());

    if let Some(input) = record.input_payload.as_deref().filter(|s| !s.is_empty()) {
        println!("    Input:    {}", input);
    }
    if let Some(output) = record.output.as_deref().filter(|s| !s.is_empty()) {
        println!("    Output:   {}", output.trim_end());
    }
    if let Some(error) = record.error_message.as_deref().filter(|s| !s.is_empty()) {
        println!("    Error:    {}", error.trim_end().red());
    }
    println!();
}

/// Print a function summary
pub fn print_function_summary(function: &FunctionSummary) {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        function.name.bold(),
        format!("(#{})", function.id).dimmed()
    );
    if let Some(runtime) = &function.runtime {
        println!("    Runtime:  {}", runtime);
    }
    if let Some(version) = function.version {
        println!("    Version:  {}", version);
    }
    if let Some(description) = function.description.as_deref().filter(|s| !s.is_empty()) {
        println!("    About:    {}", description.dimmed());
    }
    println!("    Uploaded: {}", format_time(function.upload_time).dimmed());
    println!();
}

/// Print a user summary
pub fn print_user_summary(user: &UserSummary) {
    let role = user.role.as_deref().unwrap_or("-");
    println!(
        "  {} {} {}  {}",
        "▸".cyan(),
        user.username.bold(),
        format!("(#{})", user.id).dimmed(),
        if user.is_admin() {
            role.magenta()
        } else {
            role.normal()
        }
    );
    if let Some(email) = &user.email {
        println!("    Email:    {}", email);
    }
    if let Some(status) = &user.status {
        println!("    Status:   {}", status.dimmed());
    }
    println!();
}

/// Print a notification the way the web UI would toast it
pub fn print_notification(notification: &Notification) {
    let title = match notification.kind {
        NotificationKind::Info => notification.title.cyan().bold(),
        NotificationKind::Success => notification.title.green().bold(),
        NotificationKind::Destructive => notification.title.red().bold(),
    };
    eprintln!("{} {}", title, notification.description.dimmed());
}

/// Newest first; records without a timestamp go last
pub fn sort_newest_first(records: &mut [ExecutionRecord]) {
    records.sort_by(|a, b| b.execution_time.cmp(&a.execution_time));
}

fn opt_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}
