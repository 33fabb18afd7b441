//! Function DTOs

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Source code uploaded as text, sent as form fields
///
/// The backend encrypts the code at rest and derives the stored file name
/// from the runtime, so only `python`, `js` and `java` get a meaningful
/// extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFunction {
    pub code: String,
    pub name: String,
    pub runtime: String,
    #[serde(default)]
    pub description: String,
    pub user_id: UserId,
}

impl UploadFunction {
    /// Guesses the runtime from a source file extension
    pub fn runtime_for_extension(extension: &str) -> Option<&'static str> {
        match extension.to_ascii_lowercase().as_str() {
            "py" => Some("python"),
            "js" | "mjs" | "cjs" => Some("js"),
            "java" => Some("java"),
            _ => None,
        }
    }
}
