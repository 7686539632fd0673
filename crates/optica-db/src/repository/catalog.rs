//! # Catalog Repository
//!
//! Products and contact lenses, one namespace each per store.
//!
//! The back-office loads a store's whole catalog into an
//! [`InMemoryCatalog`], lets the core adjust stock on it, then writes back only
//! the entries a sale touched (see [`SaleRepository`]).
//!
//! [`SaleRepository`]: crate::repository::sale::SaleRepository

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use optica_core::{CatalogEntry, ContactLens, InMemoryCatalog, Product, ProductType};

use crate::error::DbResult;
use crate::repository::kv::{self, namespace, KvRepository};

/// Writes one catalog entry into its store's namespace.
pub(crate) async fn write_entry<'e, E>(executor: E, entry: &CatalogEntry) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    match entry {
        CatalogEntry::Product(p) => kv::put(executor, &namespace::products(&p.store_id), &p.id, p).await,
        CatalogEntry::ContactLens(l) => {
            kv::put(executor, &namespace::contact_lenses(&l.store_id), &l.id, l).await
        }
    }
}

/// Repository for catalog storage.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    fn kv(&self) -> KvRepository {
        KvRepository::new(self.pool.clone())
    }

    /// Loads a store's full catalog.
    pub async fn load(&self, store_id: &str) -> DbResult<InMemoryCatalog> {
        let kv = self.kv();
        let products: Vec<Product> = kv.list(&namespace::products(store_id)).await?;
        let lenses: Vec<ContactLens> = kv.list(&namespace::contact_lenses(store_id)).await?;

        debug!(
            store_id = %store_id,
            products = products.len(),
            contact_lenses = lenses.len(),
            "Catalog loaded"
        );

        let mut catalog = InMemoryCatalog::new();
        for product in products {
            catalog.insert_product(product);
        }
        for lens in lenses {
            catalog.insert_contact_lens(lens);
        }
        Ok(catalog)
    }

    /// Inserts or replaces a product.
    pub async fn upsert_product(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, store_id = %product.store_id, "Upserting product");
        write_entry(&self.pool, &CatalogEntry::Product(product.clone())).await
    }

    /// Inserts or replaces a contact lens.
    pub async fn upsert_contact_lens(&self, lens: &ContactLens) -> DbResult<()> {
        debug!(id = %lens.id, store_id = %lens.store_id, "Upserting contact lens");
        write_entry(&self.pool, &CatalogEntry::ContactLens(lens.clone())).await
    }

    /// Deletes an entry. Historic sales keep their item snapshots.
    pub async fn delete(&self, store_id: &str, id: &str, product_type: ProductType) -> DbResult<bool> {
        debug!(store_id = %store_id, id = %id, product_type = %product_type, "Deleting catalog entry");
        let ns = match product_type {
            ProductType::Product => namespace::products(store_id),
            ProductType::ContactLens => namespace::contact_lenses(store_id),
        };
        kv::remove(&self.pool, &ns, id).await
    }

    /// Number of products plus contact lenses in a store.
    pub async fn count(&self, store_id: &str) -> DbResult<i64> {
        let kv = self.kv();
        let products = kv.count(&namespace::products(store_id)).await?;
        let lenses = kv.count(&namespace::contact_lenses(store_id)).await?;
        Ok(products + lenses)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
