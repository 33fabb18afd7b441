use thiserror::Error;

/// Errors raised by the poll state machine itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The execution request cannot be submitted as given
    #[error("Invalid execution request: {0}")]
    InvalidRequest(String),
}
