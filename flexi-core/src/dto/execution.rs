//! Execution DTOs

use serde::{Deserialize, Serialize};

use crate::{FunctionId, UserId};

/// Request to run a function asynchronously
///
/// The input payload is opaque to the client; the backend splits it into
/// runtime arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub function_id: FunctionId,
    pub user_id: UserId,
    pub input_payload: String,
}
