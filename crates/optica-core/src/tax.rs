//! # Tax Policy
//!
//! Supplies the tax rate a store charges. Configured outside the core and
//! read once per sale build; the rate is then frozen onto the [`Sale`].
//!
//! [`Sale`]: crate::types::Sale

use std::collections::HashMap;

use crate::types::TaxRate;

/// Per-store tax rate lookup.
pub trait TaxPolicy {
    /// Rate to apply to a sale built now for `store_id`.
    fn tax_rate_for(&self, store_id: &str) -> TaxRate;
}

/// Same rate for every store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlatTaxPolicy(pub TaxRate);

impl TaxPolicy for FlatTaxPolicy {
    fn tax_rate_for(&self, _store_id: &str) -> TaxRate {
        self.0
    }
}

/// Per-store overrides on top of a default rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreTaxTable {
    default_rate: TaxRate,
    overrides: HashMap<String, TaxRate>,
}

impl StoreTaxTable {
    pub fn new(default_rate: TaxRate) -> Self {
        StoreTaxTable {
            default_rate,
            overrides: HashMap::new(),
        }
    }

    /// Sets the rate for one store.
    pub fn with_store(mut self, store_id: impl Into<String>, rate: TaxRate) -> Self {
        self.set(store_id, rate);
        self
    }

    pub fn set(&mut self, store_id: impl Into<String>, rate: TaxRate) {
        self.overrides.insert(store_id.into(), rate);
    }

    pub fn default_rate(&self) -> TaxRate {
        self.default_rate
    }
}

impl TaxPolicy for StoreTaxTable {
    fn tax_rate_for(&self, store_id: &str) -> TaxRate {
        self.overrides
            .get(store_id)
            .copied()
            .unwrap_or(self.default_rate)
    }
}
