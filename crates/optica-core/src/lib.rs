//! # optica-core: Sales and Invoicing Logic for Optica
//!
//! This crate holds the sale pricing, payment and stock rules of the Optica
//! back-office as plain synchronous functions with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Optica Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI                                       │   │
//! │  │    Checkout ──► Payments ──► Sales list ──► Receipt print      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON lines                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    optica-backoffice commands                   │   │
//! │  │    create_sale, add_payment, delete_sale, list_sales, etc.     │   │
//! │  │    (permission checks, per-store locks)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ optica-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │ builder  │ │  ledger  │ │reconcile │ │  query   │         │   │
//! │  │   │build_sale│ │add_paymnt│ │reserve   │ │filter    │         │   │
//! │  │   │          │ │          │ │release   │ │aggregate │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │   catalog • tax • clock • money • types • receipt              │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    optica-db (Database Layer)                   │   │
//! │  │              SQLite key-value store, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`builder`] - Cart → priced [`Sale`], stock reserved
//! - [`ledger`] - Append payments, re-derive balance and status
//! - [`reconcile`] - Stock reserve/release against a [`CatalogStore`]
//! - [`query`] - Filters and dashboard totals
//! - [`catalog`] - Catalog access trait and in-memory catalog
//! - [`tax`] - Per-store tax rate lookup
//! - [`receipt`] - Display-ready receipt model
//! - [`money`] - Exact decimal money
//! - [`types`] - Domain types
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level checks
//!
//! ## Example Usage
//!
//! ```rust
//! use optica_core::{
//!     add_payment, build_sale, CartInput, CartItemInput, InMemoryCatalog, Money,
//!     PaymentInput, PaymentMethod, PaymentStatus, ProductType, SaleNumberGenerator, TaxRate,
//! };
//! use rust_decimal::Decimal;
//!
//! let mut catalog = InMemoryCatalog::new();
//! # let now = chrono::Utc::now();
//! # catalog.insert_product(optica_core::Product {
//! #     id: "frame-1".into(), store_id: "s1".into(), name: "Frame".into(),
//! #     brand: None, category: None, sku: None, description: None,
//! #     price: Money::new(Decimal::new(1599, 2)), cost: Money::zero(),
//! #     stock: 5, min_stock: 1, created_at: now, updated_at: now,
//! # });
//! let cart = CartInput {
//!     store_id: "s1".into(),
//!     created_by: "u1".into(),
//!     items: vec![CartItemInput::new(
//!         "frame-1", "Frame", ProductType::Product, 2, Money::new(Decimal::new(1599, 2)),
//!     )],
//!     ..Default::default()
//! };
//!
//! let sale = build_sale(
//!     cart,
//!     TaxRate::from_percent(Decimal::new(16, 0)),
//!     now,
//!     &mut catalog,
//!     &SaleNumberGenerator::new(0),
//! )?;
//! assert_eq!(sale.total().amount(), Decimal::new(370968, 4)); // 37.0968
//!
//! let sale = add_payment(
//!     &sale,
//!     PaymentInput::new(Money::new(Decimal::new(20, 0)), PaymentMethod::Cash),
//!     now,
//! )?;
//! assert_eq!(sale.status(), PaymentStatus::Partial);
//! # Ok::<(), optica_core::SaleError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod builder;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod money;
pub mod query;
pub mod receipt;
pub mod reconcile;
pub mod sale_number;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use builder::{build_sale, CartInput, CartItemInput, PriceBreakdown};
pub use catalog::{CatalogEntry, CatalogStore, InMemoryCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{SaleError, SaleResult, ValidationError};
pub use ledger::{add_payment, PaymentInput};
pub use money::Money;
pub use query::{aggregate, filter_sales, sort_newest_first, DateRange, SaleFilter, SalesSummary, StatusCounts};
pub use receipt::{Receipt, StoreProfile};
pub use reconcile::{affected_entries, release, reserve};
pub use sale_number::SaleNumberGenerator;
pub use tax::{FlatTaxPolicy, StoreTaxTable, TaxPolicy};
pub use types::*;

use rust_decimal::Decimal;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items in a single sale.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on one line item.
///
/// Catches typos like 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted on a line item.
///
/// With the cart and quantity limits this bounds a sale total at about 10^11,
/// far inside the range of `Decimal`.
pub const MAX_UNIT_PRICE: Money = Money::new(Decimal::from_parts(1_000_000, 0, 0, false, 0));

/// Highest amount accepted as the payment collected at checkout.
pub const MAX_PAYMENT_AMOUNT: Money =
    Money::new(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

/// Maximum length of sale and payment notes.
pub const MAX_NOTES_LEN: usize = 1000;

/// Note attached to the payment recorded at sale creation.
pub const INITIAL_PAYMENT_NOTE: &str = "Initial payment";

/// Client label for sales with no client attached.
pub const WALK_IN_LABEL: &str = "Walk-in";
