//! # Payment Ledger
//!
//! Appends payments to an existing sale.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_payment(sale, payment)                                             │
//! │                                                                         │
//! │  1. amount > 0 and finite        else InvalidAmount                     │
//! │  2. amount ≤ remaining_amount    else ExceedsBalance                    │
//! │  3. append record, re-derive paid / remaining / status                  │
//! │                                                                         │
//! │  The ledger REJECTS overpayment. The sale builder CLAMPS an initial     │
//! │  payment instead. Both behaviours are intentional.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are never edited or removed, so `paid_amount` only grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{SaleError, SaleResult};
use crate::money::Money;
use crate::types::{non_blank, PaymentMethod, PaymentRecord, Sale};
use crate::validation;

/// A payment the operator is recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentInput {
    pub amount: Money,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaymentInput {
    pub fn new(amount: Money, method: PaymentMethod) -> Self {
        PaymentInput {
            amount,
            method,
            notes: None,
        }
    }

    /// Builds an input from a raw float, rejecting NaN and infinities.
    pub fn try_from_f64(amount: f64, method: PaymentMethod) -> SaleResult<Self> {
        let amount = Money::from_f64(amount)
            .ok_or_else(|| SaleError::invalid_amount("amount must be a finite number"))?;
        Ok(Self::new(amount, method))
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Records a payment against `sale` and returns the updated copy.
///
/// `sale` itself is never modified, so on error the caller still holds the
/// untouched original.
///
/// ## Example
/// ```rust
/// # use optica_core::{add_payment, PaymentInput, PaymentMethod, Money, SaleError};
/// # fn demo(sale: &optica_core::Sale) -> Result<(), SaleError> {
/// let updated = add_payment(sale, PaymentInput::new(Money::from_f64(20.0).unwrap(), PaymentMethod::Cash), chrono::Utc::now())?;
/// assert!(updated.paid_amount() >= sale.paid_amount());
/// # Ok(())
/// # }
/// ```
pub fn add_payment(sale: &Sale, payment: PaymentInput, now: DateTime<Utc>) -> SaleResult<Sale> {
    if !payment.amount.is_positive() {
        return Err(SaleError::invalid_amount("amount must be greater than zero"));
    }
    if payment.amount > sale.remaining_amount() {
        return Err(SaleError::ExceedsBalance {
            amount: payment.amount,
            remaining: sale.remaining_amount(),
        });
    }
    if let Some(notes) = &payment.notes {
        validation::validate_notes(notes)?;
    }

    let mut updated = sale.clone();
    updated.payments.push(PaymentRecord {
        id: Uuid::new_v4().to_string(),
        amount: payment.amount,
        method: payment.method,
        date: now,
        notes: payment.notes.and_then(non_blank),
    });
    updated.recompute_balance();
    updated.updated_at = now;

    debug!(
        sale_id = %updated.id,
        amount = %payment.amount,
        method = %payment.method,
        remaining = %updated.remaining_amount(),
        status = %updated.status(),
        "Payment applied"
    );

    Ok(updated)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_sale, CartInput, CartItemInput};
    use crate::catalog::tests::product;
    use crate::catalog::InMemoryCatalog;
    use crate::sale_number::SaleNumberGenerator;
    use crate::types::{PaymentStatus, ProductType, TaxRate};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 9, 15, 0, 0).unwrap()
    }

    /// Two frames at 15.99 with 16% tax: total 37.0968, nothing paid.
    fn two_frame_sale() -> Sale {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(product("frame-1", 5));
        let cart = CartInput {
            store_id: "store-1".to_string(),
            created_by: "user-1".to_string(),
            items: vec![CartItemInput::new(
                "frame-1",
                "Frame",
                ProductType::Product,
                2,
                Money::new(dec!(15.99)),
            )],
            ..Default::default()
        };
        build_sale(
            cart,
            TaxRate::from_percent(dec!(16)),
            now(),
            &mut catalog,
            &SaleNumberGenerator::new(0),
        )
        .unwrap()
    }

    fn pay(amount: rust_decimal::Decimal, method: PaymentMethod) -> PaymentInput {
        PaymentInput::new(Money::new(amount), method)
    }

    #[test]
    fn test_partial_payment() {
        let sale = two_frame_sale();
        let later = now() + Duration::hours(1);

        let updated = add_payment(&sale, pay(dec!(20), PaymentMethod::Cash), later).unwrap();

        assert_eq!(updated.paid_amount().amount(), dec!(20));
        assert_eq!(updated.remaining_amount().amount(), dec!(17.0968));
        assert_eq!(updated.remaining_amount().to_string(), "$17.10");
        assert_eq!(updated.status(), PaymentStatus::Partial);
        assert_eq!(updated.payments().len(), 1);
        assert_eq!(updated.payments()[0].date, later);
        assert_eq!(updated.updated_at, later);

        // Original untouched
        assert_eq!(sale.paid_amount(), Money::zero());
    }

    #[test]
    fn test_overpayment_rejected_and_sale_unchanged() {
        let sale = two_frame_sale();
        let sale = add_payment(&sale, pay(dec!(20), PaymentMethod::Cash), now()).unwrap();
        let snapshot = sale.clone();

        let err = add_payment(&sale, pay(dec!(20), PaymentMethod::Card), now()).unwrap_err();

        assert_eq!(
            err,
            SaleError::ExceedsBalance {
                amount: Money::new(dec!(20)),
                remaining: Money::new(dec!(17.0968)),
            }
        );
        assert_eq!(sale, snapshot);
    }

    #[test]
    fn test_exact_remaining_settles() {
        let sale = two_frame_sale();
        let sale = add_payment(&sale, pay(dec!(20), PaymentMethod::Cash), now()).unwrap();

        let settled = add_payment(&sale, pay(dec!(17.0968), PaymentMethod::Transfer), now()).unwrap();

        assert_eq!(settled.status(), PaymentStatus::Paid);
        assert!(settled.remaining_amount().is_zero());
        assert_eq!(settled.paid_amount(), settled.total());

        // Paid is terminal: nothing more can be added
        let err = add_payment(&settled, pay(dec!(0.01), PaymentMethod::Cash), now()).unwrap_err();
        assert!(matches!(err, SaleError::ExceedsBalance { .. }));
    }

    #[test]
    fn test_invalid_amounts() {
        let sale = two_frame_sale();

        for amount in [dec!(0), dec!(-5)] {
            let err = add_payment(&sale, pay(amount, PaymentMethod::Cash), now()).unwrap_err();
            assert!(matches!(err, SaleError::InvalidAmount { .. }));
        }

        assert!(matches!(
            PaymentInput::try_from_f64(f64::NAN, PaymentMethod::Cash),
            Err(SaleError::InvalidAmount { .. })
        ));
        assert!(PaymentInput::try_from_f64(f64::INFINITY, PaymentMethod::Cash).is_err());
    }

    #[test]
    fn test_paid_amount_is_monotonic() {
        let mut sale = two_frame_sale();
        let mut previous = sale.paid_amount();

        for amount in [dec!(5), dec!(0.5), dec!(10), dec!(100), dec!(21.5968), dec!(1)] {
            if let Ok(next) = add_payment(&sale, pay(amount, PaymentMethod::Cash), now()) {
                sale = next;
            }
            assert!(sale.paid_amount() >= previous);
            assert_eq!(
                sale.remaining_amount(),
                (sale.total() - sale.paid_amount()).non_negative()
            );
            assert_eq!(
                sale.paid_amount(),
                sale.payments().iter().map(|p| p.amount).sum::<Money>()
            );
            previous = sale.paid_amount();
        }

        assert_eq!(sale.status(), PaymentStatus::Paid);
    }

    #[test]
    fn test_status_matches_balance() {
        let sale = two_frame_sale();
        assert_eq!(sale.status(), PaymentStatus::Unpaid);
        assert!(sale.paid_amount().is_zero());

        let sale = add_payment(&sale, pay(dec!(1), PaymentMethod::Card), now()).unwrap();
        assert_eq!(sale.status(), PaymentStatus::Partial);
        assert!(!sale.remaining_amount().is_zero());
    }

    #[test]
    fn test_notes_kept_and_blank_dropped() {
        let sale = two_frame_sale();
        let sale = add_payment(
            &sale,
            pay(dec!(5), PaymentMethod::Cheque).with_notes("Cheque #1042"),
            now(),
        )
        .unwrap();
        let sale = add_payment(&sale, pay(dec!(5), PaymentMethod::Cash).with_notes("  "), now()).unwrap();

        assert_eq!(sale.payments()[0].notes.as_deref(), Some("Cheque #1042"));
        assert_eq!(sale.payments()[1].notes, None);
    }
}
