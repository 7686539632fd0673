//! # optica-db: Storage Layer for the Optica Back-Office
//!
//! SQLite persistence for sales, the catalog and store settings, using sqlx
//! for async access. Every record is a JSON document in a single
//! namespaced key-value table.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Optica Data Flow                                 │
//! │                                                                         │
//! │  Back-office command (create_sale)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  optica-core: build_sale / add_payment / release                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     optica-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ SaleRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo   │    │ 001_initial  │  │   │
//! │  │   │               │    │ SettingsRepo  │    │   _schema    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kv_entries (namespace, key, value JSON, updated_at)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use optica_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/optica.db")).await?;
//!
//! let catalog = db.catalog().load("store-1").await?;
//! let sales = db.sales().list("store-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::kv::{namespace, KvRepository};
pub use repository::sale::SaleRepository;
pub use repository::settings::SettingsRepository;
