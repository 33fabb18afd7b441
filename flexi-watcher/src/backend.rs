//! Backend seam for the poller
//!
//! Handles the two calls an execution watch makes:
//! - Submitting the execution request
//! - Fetching the execution records of a function

use async_trait::async_trait;
use flexi_client::{BackendClient, Result};
use flexi_core::FunctionId;
use flexi_core::domain::execution::ExecutionRecord;
use flexi_core::dto::execution::ExecutionRequest;

/// Operations the watcher performs against the FlexiFaaS backend
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Submits an execution request
    ///
    /// Returns once the backend has accepted (not finished) the execution.
    async fn submit(&self, request: &ExecutionRequest) -> Result<()>;

    /// Fetches every execution record of a function, in no particular order
    async fn function_records(&self, function_id: FunctionId) -> Result<Vec<ExecutionRecord>>;
}

#[async_trait]
impl ExecutionBackend for BackendClient {
    async fn submit(&self, request: &ExecutionRequest) -> Result<()> {
        self.execute_function(request).await
    }

    async fn function_records(&self, function_id: FunctionId) -> Result<Vec<ExecutionRecord>> {
        self.function_logs(function_id).await
    }
}
