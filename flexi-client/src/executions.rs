//! Execution submission endpoint

use crate::BackendClient;
use crate::error::{ClientError, Result};
use flexi_core::dto::execution::ExecutionRequest;
use reqwest::Method;
use tracing::debug;

impl BackendClient {
    /// Submit a function for asynchronous execution
    ///
    /// The backend enqueues the request and answers right away; the outcome
    /// shows up later as an execution log. Only the status code is checked.
    ///
    /// # Arguments
    /// * `req` - Function, user and opaque input payload
    pub async fn execute_function(&self, req: &ExecutionRequest) -> Result<()> {
        if req.function_id <= 0 || req.user_id <= 0 {
            return Err(ClientError::InvalidRequest(
                "function and user ids must be positive".to_string(),
            ));
        }

        debug!(
            "Submitting execution of function {} for user {}",
            req.function_id, req.user_id
        );

        let response = self
            .request(Method::POST, "/api/functions/execute")
            .json(req)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
