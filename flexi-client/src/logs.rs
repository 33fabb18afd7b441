//! Execution log endpoints

use crate::BackendClient;
use crate::error::Result;
use flexi_core::domain::execution::ExecutionRecord;
use flexi_core::{FunctionId, UserId};
use reqwest::Method;

impl BackendClient {
    // =============================================================================
    // Execution Logs
    // =============================================================================

    /// List execution records for a function, across all users
    ///
    /// The order of the returned records is not meaningful.
    pub async fn function_logs(&self, function_id: FunctionId) -> Result<Vec<ExecutionRecord>> {
        let path = format!("/api/logs/function/{}", function_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// List execution records created by a user
    pub async fn user_logs(&self, user_id: UserId) -> Result<Vec<ExecutionRecord>> {
        let path = format!("/api/logs/user/{}", user_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// List every execution record (admin view)
    pub async fn all_logs(&self) -> Result<Vec<ExecutionRecord>> {
        let response = self.request(Method::GET, "/api/logs").send().await?;

        self.handle_response(response).await
    }
}
