//! # Catalog Commands
//!
//! Read-only catalog views for the back-office screens.

use serde::{Deserialize, Serialize};
use tracing::debug;

use optica_core::{CatalogEntry, ContactLens, Money, Product, ProductType};

use super::require_store_id;
use crate::error::ApiError;
use crate::state::{DbState, Permission, Session};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreArgs {
    pub store_id: String,
}

/// A store's whole catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListing {
    pub products: Vec<Product>,
    pub contact_lenses: Vec<ContactLens>,
}

/// An entry at or below its reorder threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: String,
    pub name: String,
    pub product_type: ProductType,
    pub stock: i64,
    pub min_stock: i64,
    pub price: Money,
}

impl From<&CatalogEntry> for LowStockItem {
    fn from(entry: &CatalogEntry) -> Self {
        LowStockItem {
            id: entry.id().to_string(),
            name: entry.name().to_string(),
            product_type: entry.product_type(),
            stock: entry.stock(),
            min_stock: entry.min_stock(),
            price: entry.price(),
        }
    }
}

/// Products and contact lenses of a store, ordered by id.
pub async fn list_catalog(
    db: &DbState,
    session: &Session,
    args: StoreArgs,
) -> Result<CatalogListing, ApiError> {
    debug!(store_id = %args.store_id, "list_catalog command");

    require_store_id(&args.store_id)?;
    session.require(Permission::ViewSales, &args.store_id)?;

    let catalog = db.inner().catalog().load(&args.store_id).await?;

    Ok(CatalogListing {
        products: catalog.products().cloned().collect(),
        contact_lenses: catalog.contact_lenses().cloned().collect(),
    })
}

/// Reorder alerts. Lowest stock first.
pub async fn low_stock(
    db: &DbState,
    session: &Session,
    args: StoreArgs,
) -> Result<Vec<LowStockItem>, ApiError> {
    debug!(store_id = %args.store_id, "low_stock command");

    require_store_id(&args.store_id)?;
    session.require(Permission::ViewSales, &args.store_id)?;

    let catalog = db.inner().catalog().load(&args.store_id).await?;
    let mut items: Vec<LowStockItem> = catalog.low_stock().iter().map(LowStockItem::from).collect();
    items.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));

    Ok(items)
}
