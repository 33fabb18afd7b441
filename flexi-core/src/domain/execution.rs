//! Execution domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FunctionId, UserId};

/// Backend-persisted snapshot of one function invocation
///
/// Records are written by the backend's execution consumer. A record for a
/// freshly submitted execution may not exist yet when it is first queried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub function_id: Option<FunctionId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub input_payload: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, with = "crate::time::option")]
    pub execution_time: Option<DateTime<Utc>>,
}

/// Execution status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Queued,
    Running,
    Success,
    Failed,
    Error,
    /// Any status string this client does not know
    #[serde(other)]
    Unknown,
}

impl RecordStatus {
    /// Whether the backend considers the execution finished
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Error)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Queued => write!(f, "QUEUED"),
            RecordStatus::Running => write!(f, "RUNNING"),
            RecordStatus::Success => write!(f, "SUCCESS"),
            RecordStatus::Failed => write!(f, "FAILED"),
            RecordStatus::Error => write!(f, "ERROR"),
            RecordStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
