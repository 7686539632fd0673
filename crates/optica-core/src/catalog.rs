//! # Catalog Store
//!
//! Read and stock-adjustment access to a store's products and contact lenses.
//!
//! The sale builder and the reconciler only ever see the [`CatalogStore`]
//! trait. Where the records actually live (SQLite, a remote API, a test
//! fixture) is the caller's concern; [`InMemoryCatalog`] is the snapshot the
//! back-office loads per request and the one tests use.

use std::collections::BTreeMap;

use crate::money::Money;
use crate::types::{ContactLens, Product, ProductType};

// =============================================================================
// Catalog Entry
// =============================================================================

/// A product or contact lens, viewed through the fields the core needs.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    Product(Product),
    ContactLens(ContactLens),
}

impl CatalogEntry {
    pub fn id(&self) -> &str {
        match self {
            CatalogEntry::Product(p) => &p.id,
            CatalogEntry::ContactLens(l) => &l.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogEntry::Product(p) => &p.name,
            CatalogEntry::ContactLens(l) => &l.name,
        }
    }

    pub fn product_type(&self) -> ProductType {
        match self {
            CatalogEntry::Product(_) => ProductType::Product,
            CatalogEntry::ContactLens(_) => ProductType::ContactLens,
        }
    }

    pub fn price(&self) -> Money {
        match self {
            CatalogEntry::Product(p) => p.price,
            CatalogEntry::ContactLens(l) => l.price,
        }
    }

    pub fn cost(&self) -> Money {
        match self {
            CatalogEntry::Product(p) => p.cost,
            CatalogEntry::ContactLens(l) => l.cost,
        }
    }

    pub fn stock(&self) -> i64 {
        match self {
            CatalogEntry::Product(p) => p.stock,
            CatalogEntry::ContactLens(l) => l.stock,
        }
    }

    pub fn min_stock(&self) -> i64 {
        match self {
            CatalogEntry::Product(p) => p.min_stock,
            CatalogEntry::ContactLens(l) => l.min_stock,
        }
    }

    /// At or below the reorder threshold. Advisory only, never blocks a sale.
    pub fn is_low_stock(&self) -> bool {
        self.stock() <= self.min_stock()
    }

    /// Unit margin (`price − cost`).
    pub fn margin(&self) -> Money {
        self.price() - self.cost()
    }
}

// =============================================================================
// Catalog Store Trait
// =============================================================================

/// Synchronous, already-consistent catalog access.
pub trait CatalogStore {
    /// Looks up an entry by id within the collection named by `product_type`.
    fn get(&self, product_id: &str, product_type: ProductType) -> Option<CatalogEntry>;

    /// Adds `delta` to the entry's stock. Missing entries are ignored.
    fn adjust_stock(&mut self, product_id: &str, product_type: ProductType, delta: i64);

    /// Whether the entry exists.
    fn contains(&self, product_id: &str, product_type: ProductType) -> bool {
        self.get(product_id, product_type).is_some()
    }
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

/// One store's catalog held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryCatalog {
    products: BTreeMap<String, Product>,
    contact_lenses: BTreeMap<String, ContactLens>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Adds or replaces a contact lens.
    pub fn insert_contact_lens(&mut self, lens: ContactLens) {
        self.contact_lenses.insert(lens.id.clone(), lens);
    }

    /// Removes an entry, returning it if it existed.
    pub fn remove(&mut self, product_id: &str, product_type: ProductType) -> Option<CatalogEntry> {
        match product_type {
            ProductType::Product => self.products.remove(product_id).map(CatalogEntry::Product),
            ProductType::ContactLens => self
                .contact_lenses
                .remove(product_id)
                .map(CatalogEntry::ContactLens),
        }
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn contact_lenses(&self) -> impl Iterator<Item = &ContactLens> {
        self.contact_lenses.values()
    }

    /// Every entry, products first.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.products
            .values()
            .cloned()
            .map(CatalogEntry::Product)
            .chain(
                self.contact_lenses
                    .values()
                    .cloned()
                    .map(CatalogEntry::ContactLens),
            )
            .collect()
    }

    /// Entries at or below their reorder threshold.
    pub fn low_stock(&self) -> Vec<CatalogEntry> {
        self.entries()
            .into_iter()
            .filter(CatalogEntry::is_low_stock)
            .collect()
    }

    /// Current stock for an entry.
    pub fn stock_of(&self, product_id: &str, product_type: ProductType) -> Option<i64> {
        match product_type {
            ProductType::Product => self.products.get(product_id).map(|p| p.stock),
            ProductType::ContactLens => self.contact_lenses.get(product_id).map(|l| l.stock),
        }
    }

    pub fn len(&self) -> usize {
        self.products.len() + self.contact_lenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.contact_lenses.is_empty()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn get(&self, product_id: &str, product_type: ProductType) -> Option<CatalogEntry> {
        match product_type {
            ProductType::Product => self
                .products
                .get(product_id)
                .cloned()
                .map(CatalogEntry::Product),
            ProductType::ContactLens => self
                .contact_lenses
                .get(product_id)
                .cloned()
                .map(CatalogEntry::ContactLens),
        }
    }

    fn adjust_stock(&mut self, product_id: &str, product_type: ProductType, delta: i64) {
        match product_type {
            ProductType::Product => {
                if let Some(p) = self.products.get_mut(product_id) {
                    p.stock += delta;
                }
            }
            ProductType::ContactLens => {
                if let Some(l) = self.contact_lenses.get_mut(product_id) {
                    l.stock += delta;
                }
            }
        }
    }

    fn contains(&self, product_id: &str, product_type: ProductType) -> bool {
        match product_type {
            ProductType::Product => self.products.contains_key(product_id),
            ProductType::ContactLens => self.contact_lenses.contains_key(product_id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    pub(crate) fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            name: format!("Frame {}", id),
            brand: Some("Acme".to_string()),
            category: Some("frames".to_string()),
            sku: None,
            description: None,
            price: Money::new(dec!(15.99)),
            cost: Money::new(dec!(6.50)),
            stock,
            min_stock: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn lens(id: &str, stock: i64) -> ContactLens {
        ContactLens {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            name: format!("Lens {}", id),
            brand: Some("Vista".to_string()),
            lens_type: Some("monthly".to_string()),
            power: Some("-2.50".to_string()),
            base_curve: Some("8.6".to_string()),
            diameter: Some("14.2".to_string()),
            price: Money::new(dec!(42.00)),
            cost: Money::new(dec!(20.00)),
            stock,
            min_stock: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_lookup_is_scoped_by_type() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(product("shared-id", 5));

        assert!(catalog.contains("shared-id", ProductType::Product));
        assert!(!catalog.contains("shared-id", ProductType::ContactLens));
        assert!(catalog.get("shared-id", ProductType::ContactLens).is_none());
    }

    #[test]
    fn test_adjust_stock_allows_negative() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_contact_lens(lens("l1", 1));

        catalog.adjust_stock("l1", ProductType::ContactLens, -3);
        assert_eq!(catalog.stock_of("l1", ProductType::ContactLens), Some(-2));

        // Missing entries are a no-op
        catalog.adjust_stock("nope", ProductType::Product, 10);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_low_stock_and_margin() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(product("p1", 2)); // min 2 → low
        catalog.insert_product(product("p2", 10));
        catalog.insert_contact_lens(lens("l1", 4)); // min 5 → low

        let low: Vec<String> = catalog.low_stock().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(low, vec!["p1".to_string(), "l1".to_string()]);

        let entry = catalog.get("p2", ProductType::Product).unwrap();
        assert_eq!(entry.margin().amount(), dec!(9.49));
    }

    #[test]
    fn test_remove() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(product("p1", 1));
        assert!(catalog.remove("p1", ProductType::Product).is_some());
        assert!(catalog.is_empty());
    }
}
