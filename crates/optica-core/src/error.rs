//! # Error Types
//!
//! Domain-specific error types for optica-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  optica-core errors (this file)                                        │
//! │  ├── SaleError        - Sale builder / ledger / reconciler failures    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  optica-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Back-office errors (in app)                                           │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → SaleError → ApiError → UI                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is a local validation failure. None of them leave a
//! half-applied sale or a partial stock change behind.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::Money;
use crate::types::ProductType;

// =============================================================================
// Sale Error
// =============================================================================

/// Errors raised by the sale builder, the payment ledger and the reconciler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaleError {
    /// A sale was requested with no line items.
    ///
    /// Rejected before any stock is touched.
    #[error("Cannot create a sale without items")]
    EmptyCart,

    /// A line item points at a catalog entry that no longer exists.
    ///
    /// ## When This Occurs
    /// - Product or lens deleted between adding it to the cart and checkout
    /// - Item sent with the wrong `product_type`
    #[error("Unknown {product_type} in catalog: {product_id}")]
    UnknownProduct {
        product_id: String,
        product_type: ProductType,
    },

    /// Payment amount is zero, negative or not a finite number.
    #[error("Invalid payment amount: {reason}")]
    InvalidAmount { reason: String },

    /// Payment would push the paid amount past the sale total.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale total $37.10, paid $20.00
    ///      │
    ///      ▼
    /// add_payment($20.00)
    ///      │
    ///      ▼
    /// ExceedsBalance { amount: $20.00, remaining: $17.10 }
    ///      │
    ///      ▼
    /// UI shows: "Payment exceeds the outstanding balance"
    /// ```
    #[error("Payment of {amount} exceeds remaining balance of {remaining}")]
    ExceedsBalance { amount: Money, remaining: Money },

    /// Sale not found in the collection handed to the core.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl SaleError {
    /// Creates an UnknownProduct error.
    pub fn unknown_product(product_id: impl Into<String>, product_type: ProductType) -> Self {
        SaleError::UnknownProduct {
            product_id: product_id.into(),
            product_type,
        }
    }

    /// Creates an InvalidAmount error.
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        SaleError::InvalidAmount {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// An amount whose arithmetic left the range of `Decimal`.
    pub fn amount_overflow(field: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min: "0".to_string(),
            max: Decimal::MAX.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with SaleError.
pub type SaleResult<T> = Result<T, SaleError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = SaleError::ExceedsBalance {
            amount: Money::new(dec!(20)),
            remaining: Money::new(dec!(17.0968)),
        };
        assert_eq!(
            err.to_string(),
            "Payment of $20.00 exceeds remaining balance of $17.10"
        );

        let err = SaleError::unknown_product("lens-1", ProductType::ContactLens);
        assert_eq!(err.to_string(), "Unknown contact_lens in catalog: lens-1");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product_name".to_string(),
        };
        assert_eq!(err.to_string(), "product_name is required");

        let err = ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        };
        assert_eq!(err.to_string(), "discount_percent must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_sale_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let sale_err: SaleError = validation_err.into();
        assert!(matches!(sale_err, SaleError::Validation(_)));
    }
}
