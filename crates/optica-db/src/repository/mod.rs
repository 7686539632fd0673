//! # Repository Module
//!
//! Storage for the optica back-office, built on one key-value table.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Namespaces                          │
//! │                                                                         │
//! │  Back-office command                                                   │
//! │       │                                                                 │
//! │       │  db.sales().insert_with_stock(&sale, &touched)                 │
//! │       ▼                                                                 │
//! │  SaleRepository ──────────► sales:{store_id}                           │
//! │  CatalogRepository ───────► products:{store_id}                        │
//! │                    └──────► contact_lenses:{store_id}                  │
//! │  SettingsRepository ──────► settings (tax_rate:{store_id})             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  KvRepository / kv::{put, insert, replace, remove}                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kv_entries (SQLite)                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`KvRepository`](kv::KvRepository) - Raw JSON documents
//! - [`CatalogRepository`](catalog::CatalogRepository) - Products and contact lenses
//! - [`SaleRepository`](sale::SaleRepository) - Sales, stock written atomically
//! - [`SettingsRepository`](settings::SettingsRepository) - Per-store tax rates

pub mod catalog;
pub mod kv;
pub mod sale;
pub mod settings;
