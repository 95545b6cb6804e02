//! Blob storage schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `DELETE /storage/v1/object/{bucket}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveObjectsBody {
    pub prefixes: Vec<String>,
}

/// Storage error body: `{ "statusCode": "404", "error": "not_found", "message": "Object not found" }`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StorageErrorBody {
    /// Sent as a string by most deployments, as a number by some.
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StorageErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_falls_back_to_error_field() {
        let body: StorageErrorBody =
            serde_json::from_value(json!({ "statusCode": 403, "error": "Unauthorized" }))
                .expect("parse body");
        assert_eq!(body.message(), Some("Unauthorized"));
    }

    #[test]
    fn remove_body_shape() {
        let body = RemoveObjectsBody {
            prefixes: vec!["project-1/a.jpg".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({ "prefixes": ["project-1/a.jpg"] })
        );
    }
}
