//! # Validation Module
//!
//! Input validation for cart and payment requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web UI                                                       │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Back-office command (Rust)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Sale builder / payment ledger                                │
//! │  └── Domain errors (EmptyCart, ExceedsBalance, ...)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use optica_core::validation::{validate_quantity, validate_discount_percent};
//! use rust_decimal::Decimal;
//!
//! validate_quantity(2).unwrap();
//! validate_discount_percent(Decimal::new(10, 0)).unwrap();
//! assert!(validate_discount_percent(Decimal::new(101, 0)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{
    MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_NOTES_LEN, MAX_PAYMENT_AMOUNT, MAX_UNIT_PRICE,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog reference carried by a line item.
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    Ok(())
}

/// Validates the product name snapshot on a line item.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "product_name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "product_name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an optional client email.
///
/// Only a light shape check: one `@` with text on both sides and a dot in
/// the domain part.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "client_email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates free-text notes.
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - At least 1
/// - At most MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(out_of_range("quantity", 1, MAX_ITEM_QUANTITY));
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (courtesy items).
///
/// ## Rules
/// - At least 0
/// - At most MAX_UNIT_PRICE (1,000,000)
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    validate_amount("unit_price", price, MAX_UNIT_PRICE)
}

/// Validates a discount percentage (0–100 inclusive).
pub fn validate_discount_percent(percent: Decimal) -> ValidationResult<()> {
    validate_percent("discount_percent", percent)
}

/// Validates a tax rate percentage (0–100 inclusive).
pub fn validate_tax_percent(percent: Decimal) -> ValidationResult<()> {
    validate_percent("tax_rate", percent)
}

/// Validates the amount paid up front when a sale is created.
///
/// Zero is allowed (nothing paid yet). Amounts above the total are
/// clamped by the builder, not rejected here.
pub fn validate_initial_payment(amount: Money) -> ValidationResult<()> {
    validate_amount("initial_payment", amount, MAX_PAYMENT_AMOUNT)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of line items).
pub fn validate_cart_size(items: usize) -> ValidationResult<()> {
    if items > MAX_CART_ITEMS {
        return Err(out_of_range("cart items", 1, MAX_CART_ITEMS as i64));
    }

    Ok(())
}

fn validate_percent(field: &str, percent: Decimal) -> ValidationResult<()> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(out_of_range(field, 0, 100));
    }

    Ok(())
}

fn validate_amount(field: &str, amount: Money, max: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: max.amount().to_string(),
        });
    }

    Ok(())
}

fn out_of_range(field: &str, min: i64, max: i64) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: min.to_string(),
        max: max.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
