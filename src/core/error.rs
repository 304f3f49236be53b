//! Typed error handling for the keeper framework
//!
//! Services return [`ServiceError`], storage adapters return [`StorageError`].
//! Audit failures never show up here: the recorder swallows them.
//!
//! # Error Categories
//!
//! - [`ServiceError`]: failures of a service operation, as seen by callers
//! - [`StorageError`]: failures reported by a storage adapter
//! - [`ConfigError`]: configuration parsing and validation failures
//!
//! # Example
//!
//! ```rust,ignore
//! match service.find_by_id(&ctx, 42).await {
//!     Ok(dto) => println!("Found: {:?}", dto),
//!     Err(ServiceError::NotFound { resource, id }) => println!("{resource} {id} not found"),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result alias used by every service operation
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result alias used by storage adapters
pub type StorageResult<T> = Result<T, StorageError>;

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Service Errors
// =============================================================================

/// Errors returned by service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before anything was mutated
    #[error("Invalid argument for {resource}: {message}")]
    InvalidArgument { resource: String, message: String },

    /// Record absent, or not visible to the caller
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Caller is known but may not touch the record
    #[error("Access denied to {resource} '{id}'")]
    AccessDenied { resource: String, id: String },

    /// Storage refused the write because of a uniqueness constraint
    #[error("{0}")]
    Conflict(String),

    /// Any other storage failure
    #[error(transparent)]
    Storage(StorageError),
}

impl ServiceError {
    pub fn invalid_argument(resource: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::InvalidArgument {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        ServiceError::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn access_denied(resource: impl Into<String>, id: impl ToString) -> Self {
        ServiceError::AccessDenied {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Storage(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ServiceError::NotFound { .. } => "NOT_FOUND",
            ServiceError::AccessDenied { .. } => "ACCESS_DENIED",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Storage(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServiceError::NotFound { resource, id } | ServiceError::AccessDenied { resource, id } => {
                Some(serde_json::json!({
                    "resource_type": resource,
                    "id": id
                }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<StorageError> for ServiceError {
    /// Storage conflicts pass through with their message untouched.
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { message } => ServiceError::Conflict(message),
            other => ServiceError::Storage(other),
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by storage adapters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// A uniqueness constraint was violated
    #[error("{message}")]
    Conflict { message: String },

    /// Storage backend is unavailable
    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: String },

    /// Query execution failed
    #[error("Query error in {backend}: {message}")]
    QueryError { backend: String, message: String },

    /// Stored data violates an invariant
    #[error("Data integrity error: {message}")]
    Integrity { message: String },
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Conflict { .. } => StatusCode::CONFLICT,
            StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StorageError::QueryError { .. } | StorageError::Integrity { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Conflict { .. } => "STORAGE_CONFLICT",
            StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
            StorageError::QueryError { .. } => "STORAGE_QUERY_ERROR",
            StorageError::Integrity { .. } => "STORAGE_INTEGRITY_ERROR",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// An override names a record type that was never registered
    #[error("Unknown record type '{type_name}' in resource overrides")]
    UnknownType { type_name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ServiceError::not_found("enclosure", 42);
        assert!(err.to_string().contains("enclosure"));
        assert!(err.to_string().contains("not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::invalid_argument("reptile", "id must be null").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::access_denied("reptile", 1).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_storage_conflict_passes_through_unmodified() {
        let err: ServiceError = StorageError::Conflict {
            message: "username 'alice' already taken".into(),
        }
        .into();
        match &err {
            ServiceError::Conflict(message) => {
                assert_eq!(message, "username 'alice' already taken")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.to_string(), "username 'alice' already taken");
    }

    #[test]
    fn test_other_storage_errors_are_wrapped() {
        let err: ServiceError = StorageError::Unavailable {
            backend: "memory".into(),
        }
        .into();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
    }

    #[test]
    fn test_error_response_details() {
        let response = ServiceError::not_found("reptile", 5).to_response();
        assert_eq!(response.code, "NOT_FOUND");
        let details = response.details.expect("details present");
        assert_eq!(details["id"], "5");
        assert_eq!(details["resource_type"], "reptile");
    }
}
