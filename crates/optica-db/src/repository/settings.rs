//! # Settings Repository
//!
//! Per-store values in the `settings` namespace:
//!
//! ```text
//! tax_rate:{store_id}   TaxRate   rate applied to new sales
//! sale_seq:{store_id}   u64       last sale-number sequence issued
//! ```
//!
//! The sequence is written by `SaleRepository::insert_with_stock` in the
//! same transaction as the sale and is never lowered by deletions.

use sqlx::SqlitePool;
use tracing::debug;

use optica_core::{StoreTaxTable, TaxRate};

use crate::error::DbResult;
use crate::repository::kv::{namespace, KvRepository};

const TAX_RATE_PREFIX: &str = "tax_rate:";

const SALE_SEQUENCE_PREFIX: &str = "sale_seq:";

fn tax_rate_key(store_id: &str) -> String {
    format!("{}{}", TAX_RATE_PREFIX, store_id)
}

pub(crate) fn sale_sequence_key(store_id: &str) -> String {
    format!("{}{}", SALE_SEQUENCE_PREFIX, store_id)
}

/// Repository for store settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    fn kv(&self) -> KvRepository {
        KvRepository::new(self.pool.clone())
    }

    /// The store's own rate, if one was ever set.
    pub async fn tax_rate(&self, store_id: &str) -> DbResult<Option<TaxRate>> {
        self.kv().get(namespace::SETTINGS, &tax_rate_key(store_id)).await
    }

    pub async fn set_tax_rate(&self, store_id: &str, rate: TaxRate) -> DbResult<()> {
        debug!(store_id = %store_id, rate = %rate, "Setting tax rate");
        self.kv()
            .set(namespace::SETTINGS, &tax_rate_key(store_id), &rate)
            .await
    }

    /// Highest sale-number sequence ever issued for the store.
    pub async fn last_sale_sequence(&self, store_id: &str) -> DbResult<Option<u64>> {
        self.kv().get(namespace::SETTINGS, &sale_sequence_key(store_id)).await
    }

    /// Every stored store rate on top of `default_rate`.
    pub async fn all_tax_rates(&self, default_rate: TaxRate) -> DbResult<StoreTaxTable> {
        let entries: Vec<(String, serde_json::Value)> = self.kv().entries(namespace::SETTINGS).await?;

        let mut table = StoreTaxTable::new(default_rate);
        for (key, value) in entries {
            if let Some(store_id) = key.strip_prefix(TAX_RATE_PREFIX) {
                let rate: TaxRate = serde_json::from_value(value)?;
                table.set(store_id, rate);
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use optica_core::TaxPolicy;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_tax_rates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings();

        assert_eq!(settings.tax_rate("s1").await.unwrap(), None);

        settings
            .set_tax_rate("s1", TaxRate::from_percent(dec!(16)))
            .await
            .unwrap();
        settings
            .set_tax_rate("s2", TaxRate::from_percent(dec!(8.25)))
            .await
            .unwrap();

        assert_eq!(
            settings.tax_rate("s1").await.unwrap(),
            Some(TaxRate::from_percent(dec!(16)))
        );

        let table = settings.all_tax_rates(TaxRate::zero()).await.unwrap();
        assert_eq!(table.tax_rate_for("s2").percent(), dec!(8.25));
        assert!(table.tax_rate_for("unknown").is_zero());
    }
}
