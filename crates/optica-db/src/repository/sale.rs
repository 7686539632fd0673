//! # Sale Repository
//!
//! Stores sales as JSON documents in `sales:{store_id}`.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert_with_stock(sale, touched entries)                       │
//! │         ONE transaction: sale document + updated stock                 │
//! │         + raised sale-number mark (settings/sale_seq:{store})          │
//! │                                                                         │
//! │  2. PAY / EDIT DETAILS                                                 │
//! │     └── replace(sale)                                                  │
//! │                                                                         │
//! │  3. DELETE                                                             │
//! │     └── delete_with_stock(store, sale id, restored entries)            │
//! │         ONE transaction: remove document + restored stock              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock arithmetic happens in optica-core against an in-memory catalog.
//! This repository only persists the result, atomically with the sale.

use sqlx::SqlitePool;
use tracing::debug;

use optica_core::sale_number::parse_sequence;
use optica_core::{CatalogEntry, Sale, SaleNumberGenerator};

use crate::error::{DbError, DbResult};
use crate::repository::catalog::write_entry;
use crate::repository::kv::{self, namespace, KvRepository};
use crate::repository::settings::{sale_sequence_key, SettingsRepository};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    fn kv(&self) -> KvRepository {
        KvRepository::new(self.pool.clone())
    }

    /// Every sale of a store, oldest first.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<Sale>> {
        self.kv().list(&namespace::sales(store_id)).await
    }

    /// Gets a sale by ID.
    pub async fn get(&self, store_id: &str, sale_id: &str) -> DbResult<Option<Sale>> {
        self.kv().get(&namespace::sales(store_id), sale_id).await
    }

    /// Gets a sale by ID, failing with `NotFound` if absent.
    pub async fn get_required(&self, store_id: &str, sale_id: &str) -> DbResult<Sale> {
        self.get(store_id, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }

    /// Number of stored sales for a store.
    pub async fn count(&self, store_id: &str) -> DbResult<i64> {
        self.kv().count(&namespace::sales(store_id)).await
    }

    /// Sale-number generator that continues after every number the store
    /// has issued, including numbers of deleted sales.
    ///
    /// Stores written before the mark existed fall back to the live count.
    pub async fn number_generator(&self, store_id: &str) -> DbResult<SaleNumberGenerator> {
        let sales = self.list(store_id).await?;
        let mark = SettingsRepository::new(self.pool.clone())
            .last_sale_sequence(store_id)
            .await?
            .unwrap_or(0);

        Ok(SaleNumberGenerator::from_existing(
            mark.max(sales.len() as u64),
            sales.iter().map(|s| s.sale_number.as_str()),
        ))
    }

    /// Stores a new sale together with the catalog entries whose stock it
    /// reserved.
    ///
    /// Either everything is written or nothing is.
    pub async fn insert_with_stock(&self, sale: &Sale, touched: &[CatalogEntry]) -> DbResult<()> {
        debug!(
            id = %sale.id,
            sale_number = %sale.sale_number,
            store_id = %sale.store_id,
            entries = touched.len(),
            "Inserting sale"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for entry in touched {
            write_entry(&mut *tx, entry).await?;
        }
        kv::insert(&mut *tx, &namespace::sales(&sale.store_id), &sale.id, sale).await?;

        if let Some(sequence) = parse_sequence(&sale.sale_number) {
            let key = sale_sequence_key(&sale.store_id);
            let mark: Option<u64> = kv::fetch(&mut *tx, namespace::SETTINGS, &key).await?;
            if mark.map_or(true, |m| sequence > m) {
                kv::put(&mut *tx, namespace::SETTINGS, &key, &sequence).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Overwrites a stored sale (after a payment or a details edit).
    pub async fn replace(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, status = %sale.status(), "Replacing sale");

        let found = kv::replace(&self.pool, &namespace::sales(&sale.store_id), &sale.id, sale).await?;
        if !found {
            return Err(DbError::not_found("Sale", &sale.id));
        }
        Ok(())
    }

    /// Removes a sale and writes back the catalog entries whose stock was
    /// restored, in one transaction.
    pub async fn delete_with_stock(
        &self,
        store_id: &str,
        sale_id: &str,
        restored: &[CatalogEntry],
    ) -> DbResult<()> {
        debug!(
            id = %sale_id,
            store_id = %store_id,
            entries = restored.len(),
            "Deleting sale"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if !kv::remove(&mut *tx, &namespace::sales(store_id), sale_id).await? {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Err(DbError::not_found("Sale", sale_id));
        }
        for entry in restored {
            write_entry(&mut *tx, entry).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
