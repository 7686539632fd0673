//! # Inventory Reconciler
//!
//! Keeps catalog stock in step with sales.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Reconciliation                                 │
//! │                                                                         │
//! │  build_sale ──► reserve(items)                                         │
//! │                  1. resolve EVERY (product_id, product_type)            │
//! │                     └── any miss → UnknownProduct, nothing touched      │
//! │                  2. stock -= quantity for each item                     │
//! │                     (may go negative: oversold)                         │
//! │                                                                         │
//! │  delete sale ──► release(items)                                        │
//! │                  stock += quantity where the entry still exists         │
//! │                  deleted entries are skipped                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::catalog::{CatalogEntry, CatalogStore};
use crate::error::{SaleError, SaleResult};
use crate::types::SaleItem;

/// Decrements stock for every item, all-or-nothing.
///
/// Every reference is resolved before the first adjustment, so a failure
/// leaves the catalog untouched.
pub fn reserve<C>(catalog: &mut C, items: &[SaleItem]) -> SaleResult<()>
where
    C: CatalogStore + ?Sized,
{
    if let Some(missing) = items
        .iter()
        .find(|item| !catalog.contains(item.product_id(), item.product_type()))
    {
        return Err(SaleError::unknown_product(
            missing.product_id(),
            missing.product_type(),
        ));
    }

    for item in items {
        catalog.adjust_stock(item.product_id(), item.product_type(), -item.quantity());
        debug!(
            product_id = %item.product_id(),
            product_type = %item.product_type(),
            quantity = item.quantity(),
            "Stock reserved"
        );
    }

    Ok(())
}

/// Restores stock for every item whose catalog entry still exists.
///
/// ## Returns
/// Number of line items restored. Items whose entry has been deleted are
/// skipped without error.
pub fn release<C>(catalog: &mut C, items: &[SaleItem]) -> usize
where
    C: CatalogStore + ?Sized,
{
    let mut restored = 0;

    for item in items {
        if !catalog.contains(item.product_id(), item.product_type()) {
            warn!(
                product_id = %item.product_id(),
                product_type = %item.product_type(),
                "Catalog entry gone, skipping stock release"
            );
            continue;
        }
        catalog.adjust_stock(item.product_id(), item.product_type(), item.quantity());
        restored += 1;
    }

    restored
}

/// Current catalog entries touched by `items`, one per distinct reference.
///
/// The persistence layer writes these back after a reserve or release.
pub fn affected_entries<C>(catalog: &C, items: &[SaleItem]) -> Vec<CatalogEntry>
where
    C: CatalogStore + ?Sized,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert((item.product_id().to_string(), item.product_type())))
        .filter_map(|item| catalog.get(item.product_id(), item.product_type()))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{lens, product};
    use crate::catalog::InMemoryCatalog;
    use crate::money::Money;
    use crate::types::ProductType;
    use rust_decimal_macros::dec;

    fn item(id: &str, ty: ProductType, qty: i64) -> SaleItem {
        SaleItem::new(id, format!("Item {}", id), ty, qty, Money::new(dec!(10))).unwrap()
    }

    fn catalog() -> InMemoryCatalog {
        let mut c = InMemoryCatalog::new();
        c.insert_product(product("p1", 5));
        c.insert_contact_lens(lens("l1", 8));
        c
    }

    #[test]
    fn test_reserve_decrements_each_item() {
        let mut c = catalog();
        let items = vec![
            item("p1", ProductType::Product, 3),
            item("l1", ProductType::ContactLens, 2),
        ];

        reserve(&mut c, &items).unwrap();

        assert_eq!(c.stock_of("p1", ProductType::Product), Some(2));
        assert_eq!(c.stock_of("l1", ProductType::ContactLens), Some(6));
    }

    #[test]
    fn test_reserve_is_all_or_nothing() {
        let mut c = catalog();
        let before = c.clone();
        let items = vec![
            item("p1", ProductType::Product, 3),
            item("ghost", ProductType::Product, 1),
        ];

        let err = reserve(&mut c, &items).unwrap_err();

        assert_eq!(
            err,
            SaleError::unknown_product("ghost", ProductType::Product)
        );
        assert_eq!(c, before);
    }

    #[test]
    fn test_reserve_checks_product_type() {
        let mut c = catalog();
        // p1 exists as a product, not as a contact lens
        let items = vec![item("p1", ProductType::ContactLens, 1)];
        assert!(matches!(
            reserve(&mut c, &items),
            Err(SaleError::UnknownProduct { .. })
        ));
    }

    #[test]
    fn test_reserve_can_oversell() {
        let mut c = catalog();
        reserve(&mut c, &[item("p1", ProductType::Product, 7)]).unwrap();
        assert_eq!(c.stock_of("p1", ProductType::Product), Some(-2));
    }

    #[test]
    fn test_release_round_trip() {
        let mut c = catalog();
        let before = c.clone();
        let items = vec![
            item("p1", ProductType::Product, 3),
            item("l1", ProductType::ContactLens, 2),
            item("p1", ProductType::Product, 1),
        ];

        reserve(&mut c, &items).unwrap();
        assert_eq!(release(&mut c, &items), 3);
        assert_eq!(c, before);
    }

    #[test]
    fn test_release_skips_deleted_entries() {
        let mut c = catalog();
        let items = vec![
            item("p1", ProductType::Product, 3),
            item("l1", ProductType::ContactLens, 2),
        ];
        reserve(&mut c, &items).unwrap();
        c.remove("l1", ProductType::ContactLens);

        assert_eq!(release(&mut c, &items), 1);
        assert_eq!(c.stock_of("p1", ProductType::Product), Some(5));
    }

    #[test]
    fn test_affected_entries_dedupes() {
        let c = catalog();
        let items = vec![
            item("p1", ProductType::Product, 1),
            item("p1", ProductType::Product, 2),
            item("ghost", ProductType::Product, 1),
        ];
        let entries = affected_entries(&c, &items);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), "p1");
    }
}
