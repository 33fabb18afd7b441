//! Function domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FunctionId, UserId};

/// An uploaded serverless function as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSummary {
    pub id: FunctionId,
    pub name: String,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "crate::time::option")]
    pub upload_time: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::time::option")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
}
