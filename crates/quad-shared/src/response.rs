//! The wire error shape every endpoint uses.

use serde::{Deserialize, Serialize};

/// Error body: `{"error": {"message": ..., "statusCode": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl ErrorBody {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                status_code,
            },
        }
    }
}
