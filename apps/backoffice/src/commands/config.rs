//! # Config Commands
//!
//! Reading the configuration and managing per-store tax rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use optica_core::validation::validate_tax_percent;
use optica_core::{TaxPolicy, TaxRate};

use super::require_store_id;
use crate::error::ApiError;
use crate::state::{ConfigState, DbState, Permission, Session};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTaxRateArgs {
    pub store_id: String,
    /// Percent, 0–100.
    pub rate_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRateArgs {
    pub store_id: String,
}

/// Gets the current application configuration.
///
/// ## When Used
/// - App startup (to configure the UI)
/// - Receipt preview (store name, address)
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

/// Rate the next sale in `store_id` will be taxed at.
pub async fn get_tax_rate(
    db: &DbState,
    config: &ConfigState,
    session: &Session,
    args: TaxRateArgs,
) -> Result<TaxRate, ApiError> {
    debug!(store_id = %args.store_id, "get_tax_rate command");

    require_store_id(&args.store_id)?;
    session.require(Permission::ViewSales, &args.store_id)?;

    let table = db.inner().settings().all_tax_rates(config.default_tax_rate).await?;
    Ok(table.tax_rate_for(&args.store_id))
}

/// Sets a store's tax rate. Existing sales keep the rate they were built with.
pub async fn set_tax_rate(
    db: &DbState,
    session: &Session,
    args: SetTaxRateArgs,
) -> Result<TaxRate, ApiError> {
    debug!(store_id = %args.store_id, rate = %args.rate_percent, "set_tax_rate command");

    require_store_id(&args.store_id)?;
    session.require(Permission::ManageSettings, &args.store_id)?;
    validate_tax_percent(args.rate_percent)?;

    let rate = TaxRate::from_percent(args.rate_percent);
    db.inner().settings().set_tax_rate(&args.store_id, rate).await?;

    info!(store_id = %args.store_id, rate = %rate, "Tax rate updated");

    Ok(rate)
}
