//! NLQ Server - HTTP API for natural-language questions over PostgreSQL
//!
//! Wraps an [`nlq::NlqEngine`] with a small REST surface. Each question is
//! turned into SQL (a catalog template when one matches with confidence,
//! otherwise a bounded keyword-driven `SELECT`), executed against the
//! configured database, and the rows are returned as JSON.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /api/query` - `{"query": "..."}` in; `{"question", "sql", "data"}`
//!   out, plus `"message"` when no rows came back; `400 {"error": "..."}` on
//!   failure
//! - `GET /health` - Liveness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{DatabaseConfig, ServerConfig};
pub use db::{Database, DbError, PgDatabase, Row};
pub use error::{ServerError, ServerResult};
pub use routes::query::{QueryRequest, QueryResponse, NO_ROWS_MESSAGE};
pub use server::{build_router, start_server};
pub use state::ServerState;
