//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! ## Thread Safety
//! The `Database` struct from `optica-db` contains a `SqlitePool`, which
//! is thread-safe on its own. Read-modify-write cycles on one store are
//! serialised by [`StoreLocks`](super::StoreLocks), not here.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_sales(db: &DbState, ...) -> Result<Vec<Sale>, ApiError> {
//!     let sales = db.inner().sales().list(&store_id).await?;
//!     ...
//! }
//! ```

use optica_db::Database;

/// Wrapper around `Database` for command state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
