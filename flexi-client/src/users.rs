//! User administration endpoints

use crate::BackendClient;
use crate::error::Result;
use flexi_core::UserId;
use flexi_core::domain::user::UserSummary;
use reqwest::Method;

impl BackendClient {
    // =============================================================================
    // Users
    // =============================================================================

    /// List every registered user (admin view)
    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let response = self.request(Method::GET, "/api/users").send().await?;

        self.handle_response(response).await
    }

    /// Delete a user account
    pub async fn delete_user(&self, user_id: UserId) -> Result<()> {
        let path = format!("/api/users/{}", user_id);
        let response = self.request(Method::DELETE, &path).send().await?;

        self.handle_empty_response(response).await
    }
}
