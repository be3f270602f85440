/// Error types for Channel Service
///
/// Every failure a handler can surface maps onto one of five kinds. The HTTP
/// body is the shared `error_types::ErrorResponse` envelope.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use thiserror::Error;

use crate::repository::StoreError;
use crate::storage::AssetError;

/// Result type for channel-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing field, malformed id, bad page/sort/search input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Ownership mismatch or anonymous caller
    #[error("{0}")]
    Forbidden(String),

    /// A store mutation did not produce the expected result
    #[error("{0}")]
    Persistence(String),

    /// Object store upload or removal failed
    #[error("{0}")]
    ExternalStore(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    fn kind_and_code(&self) -> (&'static str, &'static str) {
        match self {
            AppError::Validation(_) => (kinds::VALIDATION_ERROR, error_codes::VALIDATION_ERROR),
            AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::RESOURCE_NOT_FOUND),
            AppError::Forbidden(_) => (kinds::AUTHORIZATION_ERROR, error_codes::NOT_RESOURCE_OWNER),
            AppError::Persistence(_) => (kinds::SERVER_ERROR, error_codes::DATABASE_ERROR),
            AppError::ExternalStore(_) => {
                (kinds::EXTERNAL_SERVICE_ERROR, error_codes::STORAGE_ERROR)
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Forbidden(_) | AppError::ExternalStore(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = self.kind_and_code();
        let response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            &self.to_string(),
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Store operation failed");
        AppError::Persistence(err.to_string())
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        AppError::ExternalStore(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::forbidden("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Persistence("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::ExternalStore("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn test_error_envelope() {
        let response = AppError::not_found("Video not found").error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["message"], "Video not found");
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "RESOURCE_NOT_FOUND");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_store_conflict_is_persistence() {
        let err: AppError = StoreError::Conflict("likes".into()).into();
        assert!(matches!(err, AppError::Persistence(_)));
    }
}
