use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ServerResponse {
    #[serde(rename = "success")]
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        data: serde_json::Value,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        message: String,
    },
}

impl ServerResponse {
    pub fn success(id: Option<String>, data: serde_json::Value) -> Self {
        Self::Success { id, data }
    }

    pub fn error(id: Option<String>, message: String) -> Self {
        Self::Error { id, message }
    }
}
