//! # State Module
//!
//! Application state for the back-office command loop.
//!
//! Each command takes only the state it needs instead of one big
//! `AppState`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │   DbState    │  │ ConfigState  │  │  StoreLocks  │  │  Session   │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │  Database    │  │  store name  │  │  store id →  │  │  user id   │  │
//! │  │  (SQLite     │  │  default tax │  │  Mutex<()>   │  │  role      │  │
//! │  │   pool)      │  │  receipt     │  │              │  │  stores    │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • StoreLocks: one tokio Mutex per store, held across read-modify-write│
//! │  • ConfigState, Session: read-only after initialization                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod locks;
mod session;

pub use config::{default_database_path, ConfigState, DEFAULT_RECEIPT_WIDTH};
pub use db::DbState;
pub use locks::StoreLocks;
pub use session::{Permission, Role, Session};
