//! Shared HTTP response envelopes
//!
//! Every response body leaving a service is wrapped in one of two shapes:
//!
//! - [`ApiResponse`] for successes: `{ statusCode, data, message, success: true }`
//! - [`ErrorResponse`] for failures: `{ statusCode, message, success: false, errorType, code }`
//!
//! Error codes live in [`error_codes`], error categories in [`error_types`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// `success` is derived from the status code (anything below 400).
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(200, data, message)
    }
}

/// Failure envelope. Carries no `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    /// Short status title ("Bad Request", "Not Found", ...)
    pub error: String,
    pub message: String,
    pub success: bool,
    pub error_type: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            status_code: status,
            error: error.to_string(),
            message: message.to_string(),
            success: false,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Machine-readable error codes
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    pub const NOT_RESOURCE_OWNER: &str = "NOT_RESOURCE_OWNER";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Error categories
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const AUTHORIZATION_ERROR: &str = "authorization_error";
    pub const SERVER_ERROR: &str = "server_error";
    pub const EXTERNAL_SERVICE_ERROR: &str = "external_service_error";
}
