//! # API Error Type
//!
//! Unified error type returned by every Ledger operation and command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Brownie Book                           │
//! │                                                                         │
//! │  brownie sale add --customer "" ...                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command → Ledger                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation? ─── ValidationError::Required ─────┐               │  │
//! │  │         │                                        │               │  │
//! │  │         ▼                                        ▼               │  │
//! │  │  Store failure? ─── DbError::Unavailable ──── ApiError ────────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: [VALIDATION_ERROR] customer name is required                  │
//! │  exit code 1                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the error is printed as `{"code": "...", "message": "..."}`.

use serde::Serialize;
use std::fmt;

use brownie_core::{CoreError, ValidationError};
use brownie_db::DbError;

use crate::state::ConfigError;

/// Error reported to the user when an operation fails.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "sale not found: 5f0c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed; nothing was attempted
    ValidationError,

    /// Record or customer not found for this owner
    NotFound,

    /// Record Store operation failed
    StoreError,

    /// Mutation attempted without a signed-in owner
    NotAuthenticated,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::StoreError => "STORE_ERROR",
            ErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts Record Store errors to API errors.
///
/// Details of unexpected failures go to the log; the user gets a short
/// message. Remote failures are reported as-is and never retried.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database transaction failed")
            }
            DbError::Unavailable(reason) => {
                tracing::warn!(%reason, "Record store unavailable");
                ApiError::new(
                    ErrorCode::StoreError,
                    format!("Record store unavailable: {}", reason),
                )
            }
            DbError::Internal(e) => {
                tracing::error!("Internal record store error: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CustomerNotFound(name) => ApiError::not_found("customer", &name),
            CoreError::NotAuthenticated { operation } => ApiError::new(
                ErrorCode::NotAuthenticated,
                format!("Sign in before running {}", operation),
            ),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_wire_code() {
        let err = ApiError::validation("customer name is required");
        assert_eq!(
            err.to_string(),
            "[VALIDATION_ERROR] customer name is required"
        );
    }

    #[test]
    fn test_serializes_code_screaming_snake() {
        let err = ApiError::new(ErrorCode::NotAuthenticated, "Sign in first");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_AUTHENTICATED");
        assert_eq!(json["message"], "Sign in first");
    }

    #[test]
    fn test_db_errors_map_to_codes() {
        let err: ApiError = DbError::not_found("sale", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "sale not found: abc");

        let err: ApiError = DbError::unavailable("network down").into();
        assert_eq!(err.code, ErrorCode::StoreError);
        assert!(err.message.contains("network down"));
    }

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: ApiError = CoreError::NotAuthenticated {
            operation: "add_sale".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let err: ApiError = CoreError::CustomerNotFound("Maria".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = ValidationError::required("date").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "date is required");
    }
}
