//! # API Error Type
//!
//! Unified error type for back-office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Back-Office                        │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  {"command":"add_payment",...}                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Permission? ──── Session::require ─────────── FORBIDDEN ───────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Domain Error? ── SaleError::ExceedsBalance ── EXCEEDS_BALANCE ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─ DbError::QueryFailed ────── DATABASE_ERROR ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ─────────────────────────────────────── {"ok": ...} ───►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"error":{"code":"EXCEEDS_BALANCE","message":"Payment of $20.00 ..."}} │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::error;

use optica_core::{SaleError, ValidationError};
use optica_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Sale not found: 3f2a..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Sale requested with no items
    EmptyCart,

    /// Line item references a deleted or mistyped catalog entry
    UnknownProduct,

    /// Payment amount zero, negative or not finite
    InvalidAmount,

    /// Payment larger than the remaining balance
    ExceedsBalance,

    /// Input validation failed, including malformed requests
    ValidationError,

    /// Resource not found
    NotFound,

    /// Session lacks the permission or the store
    Forbidden,

    /// Database operation failed
    DatabaseError,

    /// Internal server error
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyCart => "EMPTY_CART",
            ErrorCode::UnknownProduct => "UNKNOWN_PRODUCT",
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::ExceedsBalance => "EXCEEDS_BALANCE",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
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
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Serialization(e) => {
                error!("Corrupt stored data: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts sale errors to API errors.
impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        let code = match &err {
            SaleError::EmptyCart => ErrorCode::EmptyCart,
            SaleError::UnknownProduct { .. } => ErrorCode::UnknownProduct,
            SaleError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            SaleError::ExceedsBalance { .. } => ErrorCode::ExceedsBalance,
            SaleError::SaleNotFound(_) => ErrorCode::NotFound,
            SaleError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optica_core::{Money, ProductType};
    use rust_decimal_macros::dec;

    #[test]
    fn test_sale_error_codes() {
        let err: ApiError = SaleError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        let err: ApiError = SaleError::unknown_product("p1", ProductType::Product).into();
        assert_eq!(err.code, ErrorCode::UnknownProduct);

        let err: ApiError = SaleError::ExceedsBalance {
            amount: Money::new(dec!(20)),
            remaining: Money::new(dec!(17.0968)),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ExceedsBalance);
        assert_eq!(err.message, "Payment of $20.00 exceeds remaining balance of $17.10");
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");

        let err: ApiError = DbError::not_found("Sale", "s-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::forbidden("no access");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "no access");
        assert_eq!(err.to_string(), "[FORBIDDEN] no access");
    }
}
