//! # Configuration State
//!
//! Application configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`OPTICA_*`)
//! 2. Per-store tax rates in the `settings` namespace (tax only)
//! 3. Defaults (this file)
//!
//! ## Environment Variables
//! ```text
//! OPTICA_DB_PATH            database file (default: platform data dir)
//! OPTICA_STORE_NAME         receipt header
//! OPTICA_STORE_ADDRESS      receipt header lines, separated by '|'
//! OPTICA_STORE_PHONE        receipt header
//! OPTICA_CURRENCY_SYMBOL    receipt amounts
//! OPTICA_DEFAULT_TAX_RATE   percent, for stores without their own rate
//! OPTICA_RECEIPT_WIDTH      plain-text receipt width in characters (24-80)
//! OPTICA_USER_ID            session user
//! OPTICA_ROLE               owner | manager | seller | viewer
//! OPTICA_STORE_IDS          comma-separated stores the session may touch
//! ```
//!
//! Invalid values log a warning and keep the default.

use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use optica_core::receipt::{MAX_RECEIPT_WIDTH, MIN_RECEIPT_WIDTH};
use optica_core::{StoreProfile, TaxRate};

use crate::state::session::{Role, Session};

/// Default plain-text receipt width (58 mm ticket printers).
pub const DEFAULT_RECEIPT_WIDTH: usize = 32;

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Store name (displayed on receipts)
    pub store_name: String,

    /// Store address lines (for receipts)
    pub store_address: Vec<String>,

    /// Store phone (for receipts)
    pub store_phone: Option<String>,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Tax rate for stores that have none in settings.
    pub default_tax_rate: TaxRate,

    /// Plain-text receipt width in characters.
    pub receipt_width: usize,

    /// Operator running this process.
    pub user_id: String,
    pub role: Role,
    /// Empty means every store.
    pub store_ids: Vec<String>,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Optica"
    /// - Currency: $
    /// - Tax: 0% unless a store has its own rate
    /// - Session: owner of every store
    fn default() -> Self {
        ConfigState {
            database_path: default_database_path(),
            store_name: "Optica".to_string(),
            store_address: Vec::new(),
            store_phone: None,
            currency_symbol: "$".to_string(),
            default_tax_rate: TaxRate::zero(),
            receipt_width: DEFAULT_RECEIPT_WIDTH,
            user_id: "owner".to_string(),
            role: Role::Owner,
            store_ids: Vec::new(),
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = get("OPTICA_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(store_name) = get("OPTICA_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(address) = get("OPTICA_STORE_ADDRESS") {
            config.store_address = split_list(&address, '|');
        }

        config.store_phone = get("OPTICA_STORE_PHONE");

        if let Some(symbol) = get("OPTICA_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = get("OPTICA_DEFAULT_TAX_RATE") {
            match Decimal::from_str(&raw) {
                Ok(percent) if optica_core::validation::validate_tax_percent(percent).is_ok() => {
                    config.default_tax_rate = TaxRate::from_percent(percent);
                }
                _ => warn!(value = %raw, "Ignoring invalid OPTICA_DEFAULT_TAX_RATE"),
            }
        }

        if let Some(raw) = get("OPTICA_RECEIPT_WIDTH") {
            match raw.parse::<usize>() {
                Ok(width) if (MIN_RECEIPT_WIDTH..=MAX_RECEIPT_WIDTH).contains(&width) => {
                    config.receipt_width = width;
                }
                _ => warn!(value = %raw, "Ignoring invalid OPTICA_RECEIPT_WIDTH"),
            }
        }

        if let Some(user_id) = get("OPTICA_USER_ID") {
            config.user_id = user_id;
        }

        if let Some(raw) = get("OPTICA_ROLE") {
            match raw.parse::<Role>() {
                Ok(role) => config.role = role,
                Err(e) => warn!(error = %e, "Ignoring invalid OPTICA_ROLE"),
            }
        }

        if let Some(stores) = get("OPTICA_STORE_IDS") {
            config.store_ids = split_list(&stores, ',');
        }

        config
    }

    /// Store header for receipts.
    pub fn store_profile(&self) -> StoreProfile {
        StoreProfile {
            name: self.store_name.clone(),
            address_lines: self.store_address.clone(),
            phone: self.store_phone.clone(),
            currency_symbol: self.currency_symbol.clone(),
        }
    }

    /// Session of the configured operator.
    pub fn session(&self) -> Session {
        Session::new(self.user_id.clone(), self.role).with_stores(self.store_ids.clone())
    }
}

/// Platform data directory, or the working directory if there is none.
///
/// - **macOS**: `~/Library/Application Support/com.optica.backoffice/optica.db`
/// - **Windows**: `%APPDATA%\optica\backoffice\data\optica.db`
/// - **Linux**: `~/.local/share/backoffice/optica.db`
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "optica", "backoffice")
        .map(|dirs| dirs.data_dir().join("optica.db"))
        .unwrap_or_else(|| PathBuf::from("optica.db"))
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ConfigState {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigState::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.store_name, "Optica");
        assert!(config.default_tax_rate.is_zero());
        assert_eq!(config.role, Role::Owner);
        assert!(config.database_path.ends_with("optica.db"));
    }

    #[test]
    fn test_reads_variables() {
        let config = config_from(&[
            ("OPTICA_DB_PATH", "/tmp/o.db"),
            ("OPTICA_STORE_NAME", "Vision Center"),
            ("OPTICA_STORE_ADDRESS", "Av. Reforma 10 | CDMX"),
            ("OPTICA_DEFAULT_TAX_RATE", "16"),
            ("OPTICA_CURRENCY_SYMBOL", "MX$"),
            ("OPTICA_ROLE", "seller"),
            ("OPTICA_STORE_IDS", "s1, s2,"),
        ]);

        assert_eq!(config.database_path, PathBuf::from("/tmp/o.db"));
        assert_eq!(config.store_address, vec!["Av. Reforma 10", "CDMX"]);
        assert_eq!(config.default_tax_rate, TaxRate::from_percent(dec!(16)));
        assert_eq!(config.store_profile().currency_symbol, "MX$");

        let session = config.session();
        assert_eq!(session.role, Role::Seller);
        assert_eq!(session.store_ids, vec!["s1", "s2"]);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[
            ("OPTICA_DEFAULT_TAX_RATE", "lots"),
            ("OPTICA_RECEIPT_WIDTH", "3"),
            ("OPTICA_ROLE", "admin"),
        ]);

        assert!(config.default_tax_rate.is_zero());
        assert_eq!(config.receipt_width, DEFAULT_RECEIPT_WIDTH);
        assert_eq!(config.role, Role::Owner);

        let config = config_from(&[("OPTICA_RECEIPT_WIDTH", "100000")]);
        assert_eq!(config.receipt_width, DEFAULT_RECEIPT_WIDTH);

        let config = config_from(&[("OPTICA_RECEIPT_WIDTH", "48")]);
        assert_eq!(config.receipt_width, 48);
    }

    #[test]
    fn test_negative_tax_rate_rejected() {
        let config = config_from(&[("OPTICA_DEFAULT_TAX_RATE", "-5")]);
        assert!(config.default_tax_rate.is_zero());
    }
}
