//! Row API (PostgREST) error schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ "message", "code", "details", "hint" }` returned on any rejected row operation.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostgrestErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Usually a string or null; kept as `Value` since some errors put objects here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<Value>,
}

impl PostgrestErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|s| !s.trim().is_empty())
    }
}
