//! # Commands Module
//!
//! Every operation the back-office exposes, plus the dispatcher that maps a
//! JSON request onto one of them.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (dispatch)
//! ├── sale.rs     ◄─── Checkout, payments, edits, listing, receipts
//! ├── catalog.rs  ◄─── Catalog listing, reorder alerts
//! └── config.rs   ◄─── Configuration, tax rates
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  stdin line                                                             │
//! │  {"command":"add_payment","args":{"storeId":"s1","saleId":"…",         │
//! │                                   "payment":{"amount":"20"}}}           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dispatch(ctx, request)                                                 │
//! │     args ──► AddPaymentArgs (serde, camelCase)                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  sale::add_payment(&ctx.db, &ctx.locks, &ctx.session, clock, args)      │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  stdout line: {"ok":{…sale…}}  or  {"error":{"code":…,"message":…}}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs.

pub mod catalog;
pub mod config;
pub mod sale;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use optica_core::ValidationError;

use crate::error::ApiError;
use crate::AppContext;

/// One line of input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

/// Rejects a blank store id before it reaches a lock or a namespace.
pub(crate) fn require_store_id(store_id: &str) -> Result<(), ApiError> {
    if store_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "store_id".to_string(),
        }
        .into());
    }
    Ok(())
}

fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T, ApiError> {
    serde_json::from_value(args)
        .map_err(|e| ApiError::validation(format!("Invalid arguments for {}: {}", command, e)))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal(format!("Could not encode response: {}", e)))
}

/// Runs one request against the application state.
pub async fn dispatch(ctx: &AppContext, request: Request) -> Result<Value, ApiError> {
    let Request { command, args } = request;
    debug!(command = %command, "Dispatching command");

    let clock = ctx.clock.as_ref();

    match command.as_str() {
        // Sale commands
        "create_sale" => to_value(
            sale::create_sale(
                &ctx.db,
                &ctx.config,
                &ctx.locks,
                &ctx.session,
                clock,
                parse_args(&command, args)?,
            )
            .await?,
        ),
        "add_payment" => to_value(
            sale::add_payment(&ctx.db, &ctx.locks, &ctx.session, clock, parse_args(&command, args)?)
                .await?,
        ),
        "update_sale_details" => to_value(
            sale::update_sale_details(
                &ctx.db,
                &ctx.locks,
                &ctx.session,
                clock,
                parse_args(&command, args)?,
            )
            .await?,
        ),
        "delete_sale" => to_value(
            sale::delete_sale(&ctx.db, &ctx.locks, &ctx.session, parse_args(&command, args)?).await?,
        ),
        "list_sales" => to_value(
            sale::list_sales(&ctx.db, &ctx.session, clock, parse_args(&command, args)?).await?,
        ),
        "sales_summary" => to_value(
            sale::sales_summary(&ctx.db, &ctx.session, clock, parse_args(&command, args)?).await?,
        ),
        "get_receipt" => to_value(
            sale::get_receipt(&ctx.db, &ctx.config, &ctx.session, parse_args(&command, args)?)
                .await?,
        ),
        // Catalog commands
        "list_catalog" => to_value(
            catalog::list_catalog(&ctx.db, &ctx.session, parse_args(&command, args)?).await?,
        ),
        "low_stock" => {
            to_value(catalog::low_stock(&ctx.db, &ctx.session, parse_args(&command, args)?).await?)
        }
        // Config commands
        "get_config" => to_value(config::get_config(&ctx.config)),
        "get_tax_rate" => to_value(
            config::get_tax_rate(&ctx.db, &ctx.config, &ctx.session, parse_args(&command, args)?)
                .await?,
        ),
        "set_tax_rate" => to_value(
            config::set_tax_rate(&ctx.db, &ctx.session, parse_args(&command, args)?).await?,
        ),
        other => Err(ApiError::validation(format!("Unknown command: {}", other))),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
