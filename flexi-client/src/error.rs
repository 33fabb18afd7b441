//! Error types for the FlexiFaaS backend client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the backend client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The token is missing, expired or lacks permission
    #[error("Not authorized (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an error from a non-success status code and response body
    ///
    /// The backend answers with Spring's error JSON, whose `message` field is
    /// what users should see. Bodies that are not JSON are kept verbatim.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        if status == 401 || status == 403 {
            Self::Unauthorized { status, message }
        } else {
            Self::ApiError { status, message }
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// The message to put in front of a user
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiError { message, .. } | Self::Unauthorized { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the session token should be discarded
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "Unknown error".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_string))
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| trimmed.to_string())
}
