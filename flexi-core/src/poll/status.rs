//! Client-side display status

use serde::{Deserialize, Serialize};

use crate::domain::execution::RecordStatus;

/// Status shown for a poll session
///
/// Ordered `Idle < Queued < Running < {Success, Failed}`. A live session only
/// moves forward through this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Idle,
    Queued,
    Running,
    Success,
    Failed,
}

impl DisplayStatus {
    /// Maps a backend status onto the display status
    ///
    /// A record without a status is still being worked on.
    pub fn from_record(status: Option<RecordStatus>) -> Self {
        match status {
            Some(RecordStatus::Success) => Self::Success,
            Some(RecordStatus::Failed) | Some(RecordStatus::Error) => Self::Failed,
            _ => Self::Running,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Position in the forward-only order
    pub fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Queued => 1,
            Self::Running => 2,
            Self::Success | Self::Failed => 3,
        }
    }

    /// Returns `next` unless it would move backwards
    pub fn advance(self, next: Self) -> Self {
        if next.rank() >= self.rank() { next } else { self }
    }
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayStatus::Idle => write!(f, "Idle"),
            DisplayStatus::Queued => write!(f, "Queued"),
            DisplayStatus::Running => write!(f, "Running"),
            DisplayStatus::Success => write!(f, "Success"),
            DisplayStatus::Failed => write!(f, "Failed"),
        }
    }
}
