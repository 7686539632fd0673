//! # Sale Builder
//!
//! Turns a cart into a fully priced [`Sale`] and reserves its stock.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         build_sale()                                    │
//! │                                                                         │
//! │  CartInput                                                              │
//! │     │                                                                   │
//! │     ├── items empty? ───────────────────────────► EmptyCart             │
//! │     ├── field validation ───────────────────────► Validation(..)        │
//! │     ▼                                                                   │
//! │  line totals   qty × unit_price                                         │
//! │  subtotal      Σ line totals                                            │
//! │  discount      subtotal × discount% / 100                               │
//! │  tax           (subtotal − discount) × tax% / 100                       │
//! │  total         subtotal − discount + tax                                │
//! │  paid          min(initial_payment, total)      (clamped, not rejected) │
//! │     │                                                                   │
//! │     ├── reserve stock ──────────────────────────► UnknownProduct        │
//! │     ▼                                           (catalog untouched)     │
//! │  sale number, ids ──► Sale                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every price in the program is computed here. Callers never re-derive
//! discount, tax or totals themselves.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::error::{SaleError, SaleResult, ValidationError};
use crate::money::Money;
use crate::reconcile;
use crate::sale_number::SaleNumberGenerator;
use crate::types::{non_blank, PaymentMethod, PaymentRecord, PaymentStatus, ProductType, Sale, SaleItem, TaxRate};
use crate::validation;
use crate::INITIAL_PAYMENT_NOTE;

// =============================================================================
// Cart Input
// =============================================================================

/// One requested line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItemInput {
    pub product_id: String,
    pub product_name: String,
    pub product_type: ProductType,
    pub quantity: i64,
    /// Price charged per unit. May differ from the catalog price.
    pub unit_price: Money,
}

impl CartItemInput {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        product_type: ProductType,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        CartItemInput {
            product_id: product_id.into(),
            product_name: product_name.into(),
            product_type,
            quantity,
            unit_price,
        }
    }
}

/// Everything the checkout form submits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CartInput {
    pub store_id: String,
    /// User recording the sale.
    pub created_by: String,
    pub items: Vec<CartItemInput>,
    /// 0–100.
    #[ts(type = "string")]
    pub discount_percent: Decimal,
    /// Amount collected at the counter. Clamped to the sale total.
    pub initial_payment: Money,
    pub payment_method: PaymentMethod,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub notes: Option<String>,
}

impl CartInput {
    /// Runs every field check. Does not look at the catalog.
    pub fn validate(&self) -> SaleResult<()> {
        validation::validate_cart_size(self.items.len())?;

        for item in &self.items {
            validation::validate_product_id(&item.product_id)?;
            validation::validate_product_name(&item.product_name)?;
            validation::validate_quantity(item.quantity)?;
            validation::validate_unit_price(item.unit_price)?;
        }

        validation::validate_discount_percent(self.discount_percent)?;
        validation::validate_initial_payment(self.initial_payment)?;

        if let Some(email) = self.client_email.as_deref().filter(|e| !e.trim().is_empty()) {
            validation::validate_email(email)?;
        }
        if let Some(notes) = &self.notes {
            validation::validate_notes(notes)?;
        }

        Ok(())
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// The money side of a sale, before any ids or stock are involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// Prices a set of line items.
    ///
    /// Nothing is rounded; `total == subtotal − discount + tax` holds exactly.
    /// Fails with `OutOfRange` if any step leaves the range of `Decimal`.
    pub fn compute(
        items: &[SaleItem],
        discount_percent: Decimal,
        tax_rate: TaxRate,
    ) -> Result<Self, ValidationError> {
        let subtotal = items
            .iter()
            .try_fold(Money::zero(), |acc, i| acc.checked_add(i.total_price()))
            .ok_or_else(|| ValidationError::amount_overflow("subtotal"))?;
        let discount = subtotal
            .checked_percent(discount_percent)
            .ok_or_else(|| ValidationError::amount_overflow("discount"))?;
        let taxable = subtotal - discount;
        let tax = tax_rate
            .apply_to(taxable)
            .ok_or_else(|| ValidationError::amount_overflow("tax"))?;
        let total = taxable
            .checked_add(tax)
            .ok_or_else(|| ValidationError::amount_overflow("total"))?;

        Ok(PriceBreakdown {
            subtotal,
            discount,
            tax,
            total,
        })
    }
}

// =============================================================================
// Build
// =============================================================================

/// Prices a cart, reserves its stock and returns the new sale.
///
/// ## Arguments
/// * `cart` - Line items, discount, initial payment and client details
/// * `tax_rate` - The store's rate right now; copied onto the sale
/// * `now` - Creation timestamp (also the initial payment's date)
/// * `catalog` - Stock is decremented here on success
/// * `numbers` - Issues the store-unique sale number
///
/// ## Errors
/// * `EmptyCart` - No items
/// * `Validation` - A field is out of range
/// * `UnknownProduct` - An item's catalog entry does not exist
///
/// On any error the catalog is left exactly as it was.
pub fn build_sale<C>(
    cart: CartInput,
    tax_rate: TaxRate,
    now: DateTime<Utc>,
    catalog: &mut C,
    numbers: &SaleNumberGenerator,
) -> SaleResult<Sale>
where
    C: CatalogStore + ?Sized,
{
    if cart.items.is_empty() {
        return Err(SaleError::EmptyCart);
    }
    cart.validate()?;
    validation::validate_tax_percent(tax_rate.percent())?;

    let items: Vec<SaleItem> = cart
        .items
        .into_iter()
        .map(|i| {
            SaleItem::new(
                i.product_id,
                i.product_name.trim(),
                i.product_type,
                i.quantity,
                i.unit_price,
            )
        })
        .collect::<Result<_, _>>()?;

    let prices = PriceBreakdown::compute(&items, cart.discount_percent, tax_rate)?;
    let paid_amount = cart.initial_payment.min(prices.total);

    let payments = if paid_amount.is_positive() {
        vec![PaymentRecord {
            id: Uuid::new_v4().to_string(),
            amount: paid_amount,
            method: cart.payment_method,
            date: now,
            notes: Some(INITIAL_PAYMENT_NOTE.to_string()),
        }]
    } else {
        Vec::new()
    };

    reconcile::reserve(catalog, &items)?;

    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        sale_number: numbers.next(now),
        store_id: cart.store_id,
        client_id: cart.client_id.and_then(non_blank),
        client_name: cart.client_name.and_then(non_blank),
        client_email: cart.client_email.and_then(non_blank),
        items,
        subtotal: prices.subtotal,
        discount_percent: cart.discount_percent,
        discount: prices.discount,
        tax_rate,
        tax: prices.tax,
        total: prices.total,
        paid_amount,
        remaining_amount: prices.total - paid_amount,
        payments,
        status: PaymentStatus::derive(paid_amount, prices.total),
        notes: cart.notes.and_then(non_blank),
        created_at: now,
        created_by: cart.created_by,
        updated_at: now,
    };

    debug!(
        sale_id = %sale.id,
        sale_number = %sale.sale_number,
        total = %sale.total,
        status = %sale.status,
        "Sale built"
    );

    Ok(sale)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{lens, product};
    use crate::catalog::InMemoryCatalog;
    use crate::error::ValidationError;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 9, 15, 0, 0).unwrap()
    }

    fn catalog() -> InMemoryCatalog {
        let mut c = InMemoryCatalog::new();
        c.insert_product(product("frame-1", 5));
        c.insert_contact_lens(lens("lens-1", 10));
        c
    }

    fn frame_line(qty: i64) -> CartItemInput {
        CartItemInput::new(
            "frame-1",
            "Frame frame-1",
            ProductType::Product,
            qty,
            Money::new(dec!(15.99)),
        )
    }

    fn cart(items: Vec<CartItemInput>) -> CartInput {
        CartInput {
            store_id: "store-1".to_string(),
            created_by: "user-1".to_string(),
            items,
            ..Default::default()
        }
    }

    fn sixteen() -> TaxRate {
        TaxRate::from_percent(dec!(16))
    }

    #[test]
    fn test_scenario_two_frames_sixteen_percent_tax() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);

        let sale = build_sale(cart(vec![frame_line(2)]), sixteen(), now(), &mut c, &numbers).unwrap();

        assert_eq!(sale.subtotal().amount(), dec!(31.98));
        assert_eq!(sale.discount().amount(), dec!(0));
        assert_eq!(sale.tax().amount(), dec!(5.1168));
        assert_eq!(sale.total().amount(), dec!(37.0968));
        assert_eq!(sale.paid_amount(), Money::zero());
        assert_eq!(sale.remaining_amount(), sale.total());
        assert_eq!(sale.status(), PaymentStatus::Unpaid);
        assert!(sale.payments().is_empty());
        assert_eq!(sale.sale_number, "V-20260309-0001");
        assert_eq!(sale.created_at, now());
        assert!(sale.is_walk_in());
    }

    #[test]
    fn test_pricing_identity_with_discount() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);
        let mut input = cart(vec![
            frame_line(1),
            CartItemInput::new(
                "lens-1",
                "Lens lens-1",
                ProductType::ContactLens,
                3,
                Money::new(dec!(42.00)),
            ),
        ]);
        input.discount_percent = dec!(12.5);

        let sale = build_sale(input, sixteen(), now(), &mut c, &numbers).unwrap();

        let line_sum: Money = sale
            .items()
            .iter()
            .map(|i| i.unit_price().checked_mul_quantity(i.quantity()).unwrap())
            .sum();
        assert_eq!(sale.subtotal(), line_sum);
        assert_eq!(sale.subtotal().amount(), dec!(141.99));
        assert_eq!(sale.discount().amount(), dec!(17.74875));
        assert!(sale.discount() <= sale.subtotal());
        assert_eq!(sale.total(), sale.subtotal() - sale.discount() + sale.tax());
        assert_eq!(sale.discount_percent(), dec!(12.5));
    }

    #[test]
    fn test_full_discount_zero_total_is_paid() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);
        let mut input = cart(vec![frame_line(1)]);
        input.discount_percent = dec!(100);

        let sale = build_sale(input, sixteen(), now(), &mut c, &numbers).unwrap();

        assert!(sale.total().is_zero());
        assert_eq!(sale.status(), PaymentStatus::Paid);
        assert!(sale.payments().is_empty());
    }

    #[test]
    fn test_initial_payment_is_clamped_to_total() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);
        let mut input = cart(vec![frame_line(2)]);
        input.initial_payment = Money::new(dec!(50));
        input.payment_method = PaymentMethod::Card;

        let sale = build_sale(input, sixteen(), now(), &mut c, &numbers).unwrap();

        assert_eq!(sale.paid_amount(), sale.total());
        assert_eq!(sale.remaining_amount(), Money::zero());
        assert_eq!(sale.status(), PaymentStatus::Paid);

        let payment = &sale.payments()[0];
        assert_eq!(sale.payments().len(), 1);
        assert_eq!(payment.amount.amount(), dec!(37.0968));
        assert_eq!(payment.method, PaymentMethod::Card);
        assert_eq!(payment.notes.as_deref(), Some(INITIAL_PAYMENT_NOTE));
        assert_eq!(payment.date, now());
    }

    #[test]
    fn test_partial_initial_payment() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);
        let mut input = cart(vec![frame_line(2)]);
        input.initial_payment = Money::new(dec!(10));

        let sale = build_sale(input, sixteen(), now(), &mut c, &numbers).unwrap();

        assert_eq!(sale.status(), PaymentStatus::Partial);
        assert_eq!(sale.remaining_amount().amount(), dec!(27.0968));
    }

    #[test]
    fn test_empty_cart_rejected_without_stock_change() {
        let mut c = catalog();
        let before = c.clone();
        let numbers = SaleNumberGenerator::new(0);

        let err = build_sale(cart(vec![]), sixteen(), now(), &mut c, &numbers).unwrap_err();

        assert_eq!(err, SaleError::EmptyCart);
        assert_eq!(c, before);
        assert_eq!(numbers.last_sequence(), 0);
    }

    #[test]
    fn test_unknown_product_rolls_back() {
        let mut c = catalog();
        let before = c.clone();
        let numbers = SaleNumberGenerator::new(0);
        let input = cart(vec![
            frame_line(1),
            CartItemInput::new("gone", "Old frame", ProductType::Product, 1, Money::new(dec!(5))),
        ]);

        let err = build_sale(input, sixteen(), now(), &mut c, &numbers).unwrap_err();

        assert_eq!(err, SaleError::unknown_product("gone", ProductType::Product));
        assert_eq!(c, before);
    }

    #[test]
    fn test_build_reserves_stock() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);

        build_sale(cart(vec![frame_line(3)]), sixteen(), now(), &mut c, &numbers).unwrap();

        assert_eq!(c.stock_of("frame-1", ProductType::Product), Some(2));
    }

    #[test]
    fn test_field_validation() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);

        let err = build_sale(cart(vec![frame_line(0)]), sixteen(), now(), &mut c, &numbers).unwrap_err();
        assert!(matches!(
            err,
            SaleError::Validation(ValidationError::MustBePositive { .. })
        ));

        let mut input = cart(vec![frame_line(1)]);
        input.discount_percent = dec!(120);
        assert!(build_sale(input, sixteen(), now(), &mut c, &numbers).is_err());

        let mut input = cart(vec![frame_line(1)]);
        input.initial_payment = Money::new(dec!(-1));
        assert!(build_sale(input, sixteen(), now(), &mut c, &numbers).is_err());

        let mut input = cart(vec![frame_line(1)]);
        input.client_email = Some("nope".to_string());
        assert!(build_sale(input, sixteen(), now(), &mut c, &numbers).is_err());

        assert_eq!(c.stock_of("frame-1", ProductType::Product), Some(5));
    }

    #[test]
    fn test_huge_unit_price_rejected_without_panic() {
        let mut c = catalog();
        let before = c.clone();
        let numbers = SaleNumberGenerator::new(0);
        let input = cart(vec![CartItemInput::new(
            "frame-1",
            "Frame frame-1",
            ProductType::Product,
            2,
            Money::new(Decimal::MAX),
        )]);

        let err = build_sale(input, sixteen(), now(), &mut c, &numbers).unwrap_err();

        assert!(matches!(
            err,
            SaleError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "unit_price"
        ));
        assert_eq!(c, before);
        assert_eq!(numbers.last_sequence(), 0);
    }

    #[test]
    fn test_largest_accepted_cart_prices_exactly() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);
        let mut input = cart(vec![CartItemInput::new(
            "frame-1",
            "Frame frame-1",
            ProductType::Product,
            crate::MAX_ITEM_QUANTITY,
            crate::MAX_UNIT_PRICE,
        )]);
        input.initial_payment = crate::MAX_PAYMENT_AMOUNT;

        let sale = build_sale(input, sixteen(), now(), &mut c, &numbers).unwrap();

        assert_eq!(sale.subtotal().amount(), dec!(999000000));
        assert_eq!(sale.total().amount(), dec!(1158840000));
        assert_eq!(sale.paid_amount().amount(), dec!(1000000000));
        assert_eq!(sale.status(), PaymentStatus::Partial);
    }

    #[test]
    fn test_price_breakdown_reports_overflow() {
        let item = SaleItem::new("p1", "Frame", ProductType::Product, 1, Money::new(Decimal::MAX))
            .unwrap();

        let err = PriceBreakdown::compute(&[item.clone(), item], dec!(0), sixteen()).unwrap_err();

        assert!(matches!(
            err,
            ValidationError::OutOfRange { ref field, .. } if field == "subtotal"
        ));
    }

    #[test]
    fn test_unit_price_override_and_client_details() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(41);
        let mut input = cart(vec![CartItemInput::new(
            "frame-1",
            "  Frame frame-1  ",
            ProductType::Product,
            1,
            Money::new(dec!(9.99)),
        )]);
        input.client_name = Some("Ana Ruiz".to_string());
        input.client_email = Some("  ".to_string());
        input.notes = Some("Pick up Friday".to_string());

        let sale = build_sale(input, TaxRate::zero(), now(), &mut c, &numbers).unwrap();

        assert_eq!(sale.items()[0].unit_price().amount(), dec!(9.99));
        assert_eq!(sale.items()[0].product_name(), "Frame frame-1");
        assert_eq!(sale.client_label(), "Ana Ruiz");
        assert_eq!(sale.client_email, None);
        assert_eq!(sale.notes.as_deref(), Some("Pick up Friday"));
        assert_eq!(sale.sale_number, "V-20260309-0042");
        assert_eq!(sale.tax(), Money::zero());
    }

    #[test]
    fn test_tax_rate_is_snapshotted() {
        let mut c = catalog();
        let numbers = SaleNumberGenerator::new(0);
        let mut rate = sixteen();

        let sale = build_sale(cart(vec![frame_line(1)]), rate, now(), &mut c, &numbers).unwrap();
        rate = TaxRate::from_percent(dec!(21));

        assert_eq!(sale.tax_rate().percent(), dec!(16));
        assert_ne!(sale.tax_rate(), rate);
    }
}
