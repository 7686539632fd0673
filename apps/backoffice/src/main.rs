//! # Optica Back-Office Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Optica Back-Office                               │
//! │                                                                         │
//! │  UI process ──stdin──► JSON request per line                            │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Rust Backend (this crate)                     │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► Starts the runtime                                │  │
//! │  │  lib.rs ─────► Logging, config, database, command loop           │  │
//! │  │  commands/ ──► create_sale, add_payment, list_sales, ...         │  │
//! │  │  state/ ─────► DbState, ConfigState, StoreLocks, Session         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  UI process ◄─stdout── JSON response per line     (logs on stderr)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The actual setup is in lib.rs for better testability
    optica_backoffice::run().await
}
