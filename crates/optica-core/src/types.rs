//! # Domain Types
//!
//! Core domain types used throughout the back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ Product         │   │      Sale       │   │  PaymentRecord  │       │
//! │  │ ContactLens     │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  ─────────────  │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  id             │   │  sale_number    │   │  amount         │       │
//! │  │  price / cost   │   │  items[]        │   │  method         │       │
//! │  │  stock          │   │  payments[]     │   │  date           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  PaymentStatus  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  percent        │   │  Unpaid         │   │  Cash  Card     │       │
//! │  │  16 = 16%       │   │  Partial  Paid  │   │  Transfer Cheque│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A [`SaleItem`] copies the product name and unit price at the moment of
//! sale. Historic sales never re-resolve the catalog, so renaming or deleting
//! a product leaves old invoices intact.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::WALK_IN_LABEL;

// =============================================================================
// Tax Rate
// =============================================================================

/// Store tax rate expressed as a percentage (`16` = 16%).
///
/// Read once when a sale is built and copied onto it, so later rate changes
/// never alter historic sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct TaxRate(#[ts(type = "string")] Decimal);

impl TaxRate {
    /// Creates a tax rate from a percentage.
    #[inline]
    pub const fn from_percent(percent: Decimal) -> Self {
        TaxRate(percent)
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Tax owed on a taxable base. `None` on overflow.
    pub fn apply_to(&self, taxable: Money) -> Option<Money> {
        taxable.checked_percent(self.0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Catalog Records
// =============================================================================

/// Which catalog collection a line item reconciles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProductType {
    /// Frames, sunglasses, cases, solutions, accessories.
    Product,
    /// Contact lenses (tracked separately, with optical parameters).
    ContactLens,
}

impl ProductType {
    /// Wire name (`product` / `contact_lens`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Product => "product",
            ProductType::ContactLens => "contact_lens",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A general product sold by a store (frames, sunglasses, accessories).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Category label (e.g. "frames", "sunglasses").
    pub category: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    /// Unit sale price.
    pub price: Money,
    /// Unit cost (margin reporting only).
    pub cost: Money,
    /// On-hand quantity. Negative means oversold.
    pub stock: i64,
    /// Reorder threshold, advisory only.
    pub min_stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A contact lens SKU with its optical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactLens {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Wear schedule / material (e.g. "daily", "monthly", "toric").
    pub lens_type: Option<String>,
    /// Sphere power, kept as printed on the box (e.g. "-2.50").
    pub power: Option<String>,
    pub base_curve: Option<String>,
    pub diameter: Option<String>,
    pub price: Money,
    pub cost: Money,
    pub stock: i64,
    pub min_stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Cheque,
}

impl PaymentMethod {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Cheque => "cheque",
        }
    }

    /// Label printed on receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Bank transfer",
            PaymentMethod::Cheque => "Cheque",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state of a sale, always derived from its ledger.
///
/// ```text
///   unpaid ──(0 < amount < remaining)──► partial
///     │                                    │
///     └──────(amount settles total)────────┴──► paid (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentStatus {
    /// Nothing paid yet.
    Unpaid,
    /// Some money collected, balance outstanding.
    Partial,
    /// Balance fully settled.
    Paid,
}

impl PaymentStatus {
    /// Derives the status from paid and total amounts.
    ///
    /// A settled balance wins over a zero paid amount, so a zero-total sale
    /// is `Paid`.
    pub fn derive(paid: Money, total: Money) -> Self {
        if paid >= total {
            PaymentStatus::Paid
        } else if paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// `total_price` is computed in [`SaleItem::new`] and has no setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    product_id: String,
    /// Product name at time of sale (frozen).
    product_name: String,
    product_type: ProductType,
    quantity: i64,
    /// Unit price at time of sale (frozen, may be an operator override).
    unit_price: Money,
    total_price: Money,
}

impl SaleItem {
    /// Creates a line item and computes its total.
    ///
    /// Fails with `OutOfRange` if the line total does not fit in a `Decimal`.
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        product_type: ProductType,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, ValidationError> {
        let total_price = unit_price
            .checked_mul_quantity(quantity)
            .ok_or_else(|| ValidationError::amount_overflow("total_price"))?;

        Ok(SaleItem {
            product_id: product_id.into(),
            product_name: product_name.into(),
            product_type,
            quantity,
            unit_price,
            total_price,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Line total (`quantity × unit_price`).
    pub fn total_price(&self) -> Money {
        self.total_price
    }
}

// =============================================================================
// Payment Record
// =============================================================================

/// One entry in a sale's append-only payment ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentRecord {
    pub id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A point-of-sale transaction: priced cart plus payment history.
///
/// Money fields, items and payments are written only by the sale builder and
/// the payment ledger; the rest of the program reads them through accessors.
/// Client metadata and notes can be edited via [`Sale::update_details`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Human-readable number, unique within the store.
    pub sale_number: String,
    pub store_id: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub(crate) items: Vec<SaleItem>,
    pub(crate) subtotal: Money,
    #[ts(type = "string")]
    pub(crate) discount_percent: Decimal,
    pub(crate) discount: Money,
    pub(crate) tax_rate: TaxRate,
    pub(crate) tax: Money,
    pub(crate) total: Money,
    pub(crate) paid_amount: Money,
    pub(crate) remaining_amount: Money,
    pub(crate) payments: Vec<PaymentRecord>,
    pub(crate) status: PaymentStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Discount percentage the sale was built with.
    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    /// Absolute discount amount.
    pub fn discount(&self) -> Money {
        self.discount
    }

    /// Store tax rate captured at build time.
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    /// `subtotal − discount + tax`.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Sum of every recorded payment.
    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    /// `max(0, total − paid_amount)`.
    pub fn remaining_amount(&self) -> Money {
        self.remaining_amount
    }

    /// Payments in insertion order.
    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// A sale with no client record attached.
    pub fn is_walk_in(&self) -> bool {
        self.client_id.is_none() && self.client_name.is_none()
    }

    /// Client name for lists and receipts.
    pub fn client_label(&self) -> &str {
        self.client_name.as_deref().unwrap_or(WALK_IN_LABEL)
    }

    /// Total number of units sold.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity()).sum()
    }

    /// Applies an edit to client metadata and notes.
    ///
    /// Items and money are never touched here; changing them means deleting
    /// the sale and building a new one.
    pub fn update_details(&mut self, update: SaleDetailsUpdate, now: DateTime<Utc>) {
        if let Some(client_id) = update.client_id {
            self.client_id = non_blank(client_id);
        }
        if let Some(client_name) = update.client_name {
            self.client_name = non_blank(client_name);
        }
        if let Some(client_email) = update.client_email {
            self.client_email = non_blank(client_email);
        }
        if let Some(notes) = update.notes {
            self.notes = non_blank(notes);
        }
        self.updated_at = now;
    }

    /// Re-derives paid, remaining and status from the payment list.
    pub(crate) fn recompute_balance(&mut self) {
        self.paid_amount = self.payments.iter().map(|p| p.amount).sum();
        self.remaining_amount = (self.total - self.paid_amount).non_negative();
        self.status = PaymentStatus::derive(self.paid_amount, self.total);
    }
}

/// Editable sale metadata. `None` leaves a field as is; an empty string
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDetailsUpdate {
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub notes: Option<String>,
}

/// Trims a string and maps blank input to `None`.
pub(crate) fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(d: Decimal) -> Money {
        Money::new(d)
    }

    #[test]
    fn test_tax_rate_apply() {
        let rate = TaxRate::from_percent(dec!(16));
        assert_eq!(rate.apply_to(money(dec!(31.98))).unwrap().amount(), dec!(5.1168));
        assert_eq!(rate.apply_to(money(Decimal::MAX)), None);
        assert_eq!(rate.to_string(), "16%");
        assert!(TaxRate::default().is_zero());
    }

    #[test]
    fn test_sale_item_total() {
        let item = SaleItem::new("p1", "Frame", ProductType::Product, 2, money(dec!(15.99))).unwrap();
        assert_eq!(item.total_price().amount(), dec!(31.98));
    }

    #[test]
    fn test_sale_item_total_overflow_is_an_error() {
        let err = SaleItem::new("p1", "Frame", ProductType::Product, 2, money(Decimal::MAX))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { ref field, .. } if field == "total_price"
        ));
    }

    #[test]
    fn test_payment_status_derive() {
        let total = money(dec!(100));
        assert_eq!(PaymentStatus::derive(Money::zero(), total), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(money(dec!(0.01)), total), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::derive(money(dec!(100)), total), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::derive(Money::zero(), Money::zero()), PaymentStatus::Paid);
    }

    #[test]
    fn test_enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProductType::ContactLens).unwrap(),
            "\"contact_lens\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Partial).unwrap(),
            "\"partial\""
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  ".to_string()), None);
        assert_eq!(non_blank(" Ana ".to_string()), Some("Ana".to_string()));
    }
}
