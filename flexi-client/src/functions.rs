//! Function endpoints

use crate::BackendClient;
use crate::error::{ClientError, Result};
use flexi_core::domain::function::FunctionSummary;
use flexi_core::dto::function::UploadFunction;
use flexi_core::{FunctionId, UserId};
use reqwest::Method;
use tracing::debug;

impl BackendClient {
    // =============================================================================
    // Functions
    // =============================================================================

    /// List all uploaded functions
    pub async fn list_functions(&self) -> Result<Vec<FunctionSummary>> {
        let response = self.request(Method::GET, "/api/functions").send().await?;

        self.handle_response(response).await
    }

    /// List the functions owned by a user
    pub async fn user_functions(&self, user_id: UserId) -> Result<Vec<FunctionSummary>> {
        let path = format!("/api/functions/user/{}", user_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Get a function by ID
    pub async fn get_function(&self, function_id: FunctionId) -> Result<FunctionSummary> {
        let path = format!("/api/functions/{}", function_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Upload source code as a new function
    ///
    /// The fields are sent form-encoded; the backend answers with the stored
    /// function, including its new ID.
    pub async fn upload_function_text(&self, upload: &UploadFunction) -> Result<FunctionSummary> {
        if upload.name.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "function name cannot be empty".to_string(),
            ));
        }
        if upload.code.is_empty() {
            return Err(ClientError::InvalidRequest(
                "function code cannot be empty".to_string(),
            ));
        }

        debug!(
            "Uploading function {} ({}) for user {}",
            upload.name, upload.runtime, upload.user_id
        );

        let response = self
            .request(Method::POST, "/api/functions/uploadText")
            .form(upload)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a function by ID
    pub async fn delete_function(&self, function_id: FunctionId) -> Result<()> {
        let path = format!("/api/functions/{}", function_id);
        let response = self.request(Method::DELETE, &path).send().await?;

        self.handle_empty_response(response).await
    }
}
