//! # Optica Back-Office Library
//!
//! Sales and invoicing service for optical stores. Reads one JSON command
//! per stdin line and answers with one JSON line on stdout. Logs go to
//! stderr so stdout stays a clean channel.
//!
//! ## Module Organization
//! ```text
//! optica_backoffice/
//! ├── lib.rs          ◄─── You are here (startup & command loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── config.rs   ◄─── Configuration from OPTICA_* variables
//! │   ├── locks.rs    ◄─── Per-store mutual exclusion
//! │   └── session.rs  ◄─── Roles and permissions
//! ├── commands/
//! │   ├── mod.rs      ◄─── Request type & dispatch
//! │   ├── sale.rs     ◄─── Checkout, payments, listing, receipts
//! │   ├── catalog.rs  ◄─── Catalog listing, reorder alerts
//! │   └── config.rs   ◄─── Configuration, tax rates
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Wire Format
//! ```text
//! → {"command":"create_sale","args":{"storeId":"s1","items":[…]}}
//! ← {"ok":{"id":"…","saleNumber":"V-20260309-0001",…}}
//!
//! → {"command":"add_payment","args":{"storeId":"s1","saleId":"…","payment":{"amount":"50"}}}
//! ← {"error":{"code":"EXCEEDS_BALANCE","message":"Payment of $50.00 exceeds …"}}
//! ```

pub mod commands;
pub mod error;
pub mod state;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commands::Request;
use error::ApiError;
use optica_core::{Clock, SystemClock};
use optica_db::{Database, DbConfig};
use state::{ConfigState, DbState, Session, StoreLocks};

/// Everything a command may need, built once at startup.
pub struct AppContext {
    pub db: DbState,
    pub config: ConfigState,
    pub locks: StoreLocks,
    pub session: Session,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Context for the operator named in `config`, on the system clock.
    pub fn new(db: Database, config: ConfigState) -> Self {
        let session = config.session();
        AppContext {
            db: DbState::new(db),
            config,
            locks: StoreLocks::new(),
            session,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

/// One line of output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(Value),
    Error(ApiError),
}

/// Parses and runs one input line.
pub async fn handle_line(ctx: &AppContext, line: &str) -> Response {
    let result = match serde_json::from_str::<Request>(line) {
        Ok(request) => commands::dispatch(ctx, request).await,
        Err(e) => Err(ApiError::validation(format!("Malformed request: {}", e))),
    };

    match result {
        Ok(value) => Response::Ok(value),
        Err(err) => {
            warn!(code = %err.code, message = %err.message, "Command failed");
            Response::Error(err)
        }
    }
}

/// Answers every line of `reader` on `writer` until end of input.
///
/// Blank lines are skipped. Returns the number of requests handled.
pub async fn serve<R, W>(ctx: &AppContext, reader: R, mut writer: W) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(ctx, line).await;
        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    Ok(handled)
}

/// Runs the back-office over stdin/stdout.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,optica=debug,sqlx=warn; override with RUST_LOG      │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • OPTICA_* variables over defaults                                  │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Serve ────────────────────────────────────────────────────────────► │
/// │     • One request per line until stdin closes                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Optica back-office");

    let config = ConfigState::from_env();
    if let Some(dir) = config.database_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    info!(db_path = %config.database_path.display(), "Database path determined");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database connected and migrations applied");

    let ctx = AppContext::new(db.clone(), config);
    info!(
        user_id = %ctx.session.user_id,
        role = %ctx.session.role,
        "Session ready"
    );

    let handled = serve(&ctx, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!(handled, "Input closed, shutting down");

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=optica=trace` - Show trace for optica crates only
/// - Default: `info,optica=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,optica=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use optica_core::Money;
    use rust_decimal_macros::dec;

    async fn context() -> AppContext {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut product = optica_core::Product {
            id: "p1".to_string(),
            store_id: "s1".to_string(),
            name: "Case".to_string(),
            brand: None,
            category: Some("accessories".to_string()),
            sku: None,
            description: None,
            price: Money::new(dec!(5.99)),
            cost: Money::new(dec!(2)),
            stock: 10,
            min_stock: 1,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        db.catalog().upsert_product(&product).await.unwrap();
        product.id = "p2".to_string();
        db.catalog().upsert_product(&product).await.unwrap();
        AppContext::new(db, ConfigState::default())
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let ctx = context().await;
        let input = concat!(
            r#"{"command":"create_sale","args":{"storeId":"s1","items":[{"productId":"p1","productName":"Case","productType":"product","quantity":1,"unitPrice":"5.99"}]}}"#,
            "\n",
            "\n",
            "not json\n",
            r#"{"command":"list_sales","args":{"storeId":"s1"}}"#,
            "\n",
        );
        let mut output = Vec::new();

        let handled = serve(&ctx, input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(handled, 3);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        let sale: optica_core::Sale = serde_json::from_value(lines[0]["ok"].clone()).unwrap();
        assert_eq!(sale.total().amount(), dec!(5.99));
        assert_eq!(lines[1]["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(lines[2]["ok"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let ctx = context().await;
        let response = handle_line(
            &ctx,
            r#"{"command":"create_sale","args":{"storeId":"s1","items":[]}}"#,
        )
        .await;

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], "EMPTY_CART");
        assert_eq!(value["error"]["message"], "Cannot create a sale without items");
    }
}
