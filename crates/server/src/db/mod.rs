//! Schema provider and query executor.
//!
//! The HTTP layer talks to the database only through [`Database`]: one call to
//! list the tables the fallback planner may choose from, one to run the
//! generated SQL. [`PgDatabase`] is the PostgreSQL implementation.

mod encode;
mod postgres;

use async_trait::async_trait;
use nlq::SchemaSnapshot;
use serde_json::{Map, Value};
use thiserror::Error;

pub use self::encode::encode_text_value;
pub use self::postgres::PgDatabase;

/// One result row, keyed by column name in select-list order.
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("could not connect to database: {0}")]
    Connect(String),

    #[error("could not read schema: {0}")]
    Schema(String),

    /// The statement itself was rejected or failed while running.
    #[error("{0}")]
    Query(String),
}

#[async_trait]
pub trait Database: Send + Sync {
    /// Tables and columns of the configured schema, ordered by table name.
    async fn schema(&self) -> Result<SchemaSnapshot, DbError>;

    /// Runs a single SQL statement and returns its rows.
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, DbError>;
}
