//! Error body of the data service and its client-side form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Internal,
}

/// JSON body of every non-success response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Offending payload field, set for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::new(ErrorCode::Validation, message)
        }
    }
}

/// A rejected request as seen by the client: the HTTP status plus whatever
/// error body came with it.
#[derive(Debug, Error)]
#[error("service answered {status}: {}", .error.message)]
pub struct ApiException {
    pub status: u16,
    pub error: ApiError,
}

impl ApiException {
    pub fn new(status: u16, error: ApiError) -> Self {
        Self { status, error }
    }

    pub fn code(&self) -> ErrorCode {
        self.error.code
    }
}
