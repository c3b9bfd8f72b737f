use serde::{Deserialize, Serialize};

/// Error envelope returned by the backend on non-2xx responses. `detail` is a
/// plain message for most errors and a structured list for request
/// validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: serde_json::Value::String(message.into()),
        }
    }

    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
