//! # Sale Commands
//!
//! Checkout, payments, edits, deletion, listing and receipts.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale                                                            │
//! │    require(CreateSale) ─► lock(store) ─► load catalog + tax + numbers   │
//! │    ─► build_sale (reserves stock in memory)                             │
//! │    ─► insert_with_stock (sale + touched entries, one transaction)       │
//! │                                                                         │
//! │  delete_sale                                                            │
//! │    require(DeleteSale) ─► lock(store) ─► load sale + catalog            │
//! │    ─► release (restores stock in memory)                                │
//! │    ─► delete_with_stock (removal + restored entries, one transaction)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing reaches the database unless the core operation succeeded.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use optica_core::receipt::{MAX_RECEIPT_WIDTH, MIN_RECEIPT_WIDTH};
use optica_core::validation;
use optica_core::{
    affected_entries, aggregate, build_sale, filter_sales, release, sort_newest_first, CartInput,
    Clock, PaymentInput, Receipt, Sale, SaleDetailsUpdate, SaleFilter, SalesSummary, TaxPolicy,
    ValidationError,
};

use super::require_store_id;
use crate::error::ApiError;
use crate::state::{ConfigState, DbState, Permission, Session, StoreLocks};

// =============================================================================
// Arguments & Responses
// =============================================================================

/// Identifies one sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRef {
    pub store_id: String,
    pub sale_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPaymentArgs {
    pub store_id: String,
    pub sale_id: String,
    pub payment: PaymentInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsArgs {
    pub store_id: String,
    pub sale_id: String,
    pub details: SaleDetailsUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesArgs {
    pub store_id: String,
    #[serde(default)]
    pub filter: SaleFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptArgs {
    pub store_id: String,
    pub sale_id: String,
    /// Plain-text width, 24 to 80. Defaults to the configured receipt width.
    #[serde(default)]
    pub width: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSaleResponse {
    pub sale_id: String,
    pub sale_number: String,
    /// Line items whose stock went back to the catalog.
    pub restored_items: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub receipt: Receipt,
    pub text: String,
}

// =============================================================================
// Commands
// =============================================================================

/// Builds and stores a sale, reserving its stock.
pub async fn create_sale(
    db: &DbState,
    config: &ConfigState,
    locks: &StoreLocks,
    session: &Session,
    clock: &dyn Clock,
    mut cart: CartInput,
) -> Result<Sale, ApiError> {
    debug!(store_id = %cart.store_id, items = cart.items.len(), "create_sale command");

    require_store_id(&cart.store_id)?;
    session.require(Permission::CreateSale, &cart.store_id)?;
    if cart.created_by.trim().is_empty() {
        cart.created_by = session.user_id.clone();
    }

    let db = db.inner();
    let _guard = locks.lock(&cart.store_id).await;

    let tax_rate = db
        .settings()
        .all_tax_rates(config.default_tax_rate)
        .await?
        .tax_rate_for(&cart.store_id);
    let mut catalog = db.catalog().load(&cart.store_id).await?;
    let numbers = db.sales().number_generator(&cart.store_id).await?;

    let sale = build_sale(cart, tax_rate, clock.now(), &mut catalog, &numbers)?;

    let touched = affected_entries(&catalog, sale.items());
    db.sales().insert_with_stock(&sale, &touched).await?;

    info!(
        sale_id = %sale.id,
        sale_number = %sale.sale_number,
        store_id = %sale.store_id,
        total = %sale.total(),
        status = %sale.status(),
        "Sale created"
    );

    Ok(sale)
}

/// Records a payment against a stored sale.
pub async fn add_payment(
    db: &DbState,
    locks: &StoreLocks,
    session: &Session,
    clock: &dyn Clock,
    args: AddPaymentArgs,
) -> Result<Sale, ApiError> {
    debug!(sale_id = %args.sale_id, amount = %args.payment.amount, "add_payment command");

    require_store_id(&args.store_id)?;
    session.require(Permission::RecordPayment, &args.store_id)?;

    let db = db.inner();
    let _guard = locks.lock(&args.store_id).await;

    let sale = db.sales().get_required(&args.store_id, &args.sale_id).await?;
    let updated = optica_core::add_payment(&sale, args.payment, clock.now())?;
    db.sales().replace(&updated).await?;

    info!(
        sale_id = %updated.id,
        paid = %updated.paid_amount(),
        remaining = %updated.remaining_amount(),
        status = %updated.status(),
        "Payment recorded"
    );

    Ok(updated)
}

/// Edits client details and notes. Never touches items or money.
pub async fn update_sale_details(
    db: &DbState,
    locks: &StoreLocks,
    session: &Session,
    clock: &dyn Clock,
    args: UpdateDetailsArgs,
) -> Result<Sale, ApiError> {
    debug!(sale_id = %args.sale_id, "update_sale_details command");

    require_store_id(&args.store_id)?;
    session.require(Permission::EditSale, &args.store_id)?;

    if let Some(email) = args.details.client_email.as_deref().filter(|e| !e.trim().is_empty()) {
        validation::validate_email(email)?;
    }
    if let Some(notes) = &args.details.notes {
        validation::validate_notes(notes)?;
    }

    let db = db.inner();
    let _guard = locks.lock(&args.store_id).await;

    let mut sale = db.sales().get_required(&args.store_id, &args.sale_id).await?;
    sale.update_details(args.details, clock.now());
    db.sales().replace(&sale).await?;

    info!(sale_id = %sale.id, "Sale details updated");

    Ok(sale)
}

/// Deletes a sale and puts its stock back.
///
/// Items whose catalog entry has since been deleted are skipped.
pub async fn delete_sale(
    db: &DbState,
    locks: &StoreLocks,
    session: &Session,
    args: SaleRef,
) -> Result<DeleteSaleResponse, ApiError> {
    debug!(sale_id = %args.sale_id, "delete_sale command");

    require_store_id(&args.store_id)?;
    session.require(Permission::DeleteSale, &args.store_id)?;

    let db = db.inner();
    let _guard = locks.lock(&args.store_id).await;

    let sale = db.sales().get_required(&args.store_id, &args.sale_id).await?;
    let mut catalog = db.catalog().load(&args.store_id).await?;

    let restored_items = release(&mut catalog, sale.items());
    let restored = affected_entries(&catalog, sale.items());
    db.sales()
        .delete_with_stock(&args.store_id, &sale.id, &restored)
        .await?;

    info!(
        sale_id = %sale.id,
        sale_number = %sale.sale_number,
        restored_items,
        "Sale deleted"
    );

    Ok(DeleteSaleResponse {
        sale_id: sale.id,
        sale_number: sale.sale_number,
        restored_items,
    })
}

/// Sales matching the filter, newest first.
///
/// Date ranges use calendar days in the machine's local timezone.
pub async fn list_sales(
    db: &DbState,
    session: &Session,
    clock: &dyn Clock,
    args: ListSalesArgs,
) -> Result<Vec<Sale>, ApiError> {
    debug!(store_id = %args.store_id, filter = ?args.filter, "list_sales command");

    let sales = load_filtered(db, session, clock, args).await?;
    Ok(sales)
}

/// Totals and status counts over the sales matching the filter.
pub async fn sales_summary(
    db: &DbState,
    session: &Session,
    clock: &dyn Clock,
    args: ListSalesArgs,
) -> Result<SalesSummary, ApiError> {
    debug!(store_id = %args.store_id, "sales_summary command");

    let sales = load_filtered(db, session, clock, args).await?;
    Ok(aggregate(&sales))
}

/// Receipt data plus a plain-text rendering.
pub async fn get_receipt(
    db: &DbState,
    config: &ConfigState,
    session: &Session,
    args: ReceiptArgs,
) -> Result<ReceiptResponse, ApiError> {
    debug!(sale_id = %args.sale_id, "get_receipt command");

    require_store_id(&args.store_id)?;
    session.require(Permission::ViewSales, &args.store_id)?;

    let width = args.width.unwrap_or(config.receipt_width);
    if !(MIN_RECEIPT_WIDTH..=MAX_RECEIPT_WIDTH).contains(&width) {
        return Err(ValidationError::OutOfRange {
            field: "width".to_string(),
            min: MIN_RECEIPT_WIDTH.to_string(),
            max: MAX_RECEIPT_WIDTH.to_string(),
        }
        .into());
    }

    let sale = db
        .inner()
        .sales()
        .get_required(&args.store_id, &args.sale_id)
        .await?;

    let receipt = Receipt::from_sale(&sale, &config.store_profile());
    let text = receipt.render_text(width);

    Ok(ReceiptResponse { receipt, text })
}

async fn load_filtered(
    db: &DbState,
    session: &Session,
    clock: &dyn Clock,
    mut args: ListSalesArgs,
) -> Result<Vec<Sale>, ApiError> {
    require_store_id(&args.store_id)?;
    session.require(Permission::ViewSales, &args.store_id)?;

    if let Some(text) = args.filter.text.take() {
        let text = validation::validate_search_query(&text)?;
        if !text.is_empty() {
            args.filter.text = Some(text);
        }
    }

    let sales = db.inner().sales().list(&args.store_id).await?;
    let now = clock.now().with_timezone(&Local);

    let mut sales = filter_sales(&sales, &args.filter, &now);
    sort_newest_first(&mut sales);
    Ok(sales)
}
