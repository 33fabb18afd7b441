//! FlexiFaaS HTTP Client
//!
//! A small, type-safe client for the FlexiFaaS backend REST API: submitting
//! executions, reading execution logs, managing uploaded functions and
//! administering users.
//!
//! # Example
//!
//! ```no_run
//! use flexi_client::BackendClient;
//! use flexi_core::dto::execution::ExecutionRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BackendClient::new("http://localhost:8080").with_token("eyJhbGciOi...");
//!
//!     client.execute_function(&ExecutionRequest {
//!         function_id: 42,
//!         user_id: 7,
//!         input_payload: "1 2".to_string(),
//!     }).await?;
//!
//!     let logs = client.function_logs(42).await?;
//!     println!("{} execution(s) recorded", logs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod executions;
mod functions;
mod logs;
mod users;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the FlexiFaaS backend API
///
/// Methods are grouped by resource:
/// - Executions (submit)
/// - Execution logs (by function, by user, all)
/// - Functions (list, get, upload, delete)
/// - Users (list, delete)
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// Base URL of the backend (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token attached to every request
    token: Option<String>,
}

impl BackendClient {
    /// Create a new backend client
    ///
    /// # Example
    /// ```
    /// use flexi_client::BackendClient;
    ///
    /// let client = BackendClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new backend client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Attach a bearer token (the JWT issued by the auth middleware)
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), &body));
        }

        Ok(())
    }
}
