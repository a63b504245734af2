use std::sync::Arc;

use async_trait::async_trait;
use nlq::{ColumnSchema, SchemaSnapshot, TableSchema};
use tokio::sync::Mutex;
use tokio_postgres::{Client, Column, NoTls, SimpleQueryMessage, SimpleQueryRow};
use tracing::{debug, info, warn};

use super::{encode_text_value, Database, DbError, Row};
use crate::config::DatabaseConfig;

const SCHEMA_QUERY: &str = "\
SELECT t.table_name::text, c.column_name::text, c.data_type::text \
FROM information_schema.tables t \
LEFT JOIN information_schema.columns c \
  ON c.table_schema = t.table_schema AND c.table_name = t.table_name \
WHERE t.table_schema::text = $1 \
ORDER BY t.table_name, c.ordinal_position";

/// PostgreSQL-backed [`Database`].
///
/// Connects on first use and reconnects after the connection drops, so the
/// server can start before the database is reachable.
pub struct PgDatabase {
    config: tokio_postgres::Config,
    schema: String,
    client: Mutex<Option<Arc<Client>>>,
}

impl PgDatabase {
    pub fn new(cfg: &DatabaseConfig) -> Self {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&cfg.host)
            .port(cfg.port)
            .dbname(&cfg.name)
            .user(&cfg.user)
            .password(&cfg.password)
            .application_name("nlq-server")
            .connect_timeout(cfg.connect_timeout());
        Self {
            config,
            schema: cfg.schema.clone(),
            client: Mutex::new(None),
        }
    }

    async fn client(&self) -> Result<Arc<Client>, DbError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            if !client.is_closed() {
                return Ok(Arc::clone(client));
            }
            warn!("postgres connection lost, reconnecting");
        }

        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| DbError::Connect(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!(error = %err, "postgres connection closed with error");
            }
        });
        info!(schema = %self.schema, "connected to postgres");

        let client = Arc::new(client);
        *guard = Some(Arc::clone(&client));
        Ok(client)
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn schema(&self) -> Result<SchemaSnapshot, DbError> {
        let client = self.client().await?;
        let rows = client
            .query(SCHEMA_QUERY, &[&self.schema])
            .await
            .map_err(|e| DbError::Schema(e.to_string()))?;

        let mut snapshot = SchemaSnapshot::default();
        let mut current: Option<TableSchema> = None;
        for row in rows {
            let table: String = row.try_get(0).map_err(|e| DbError::Schema(e.to_string()))?;
            let column: Option<String> =
                row.try_get(1).map_err(|e| DbError::Schema(e.to_string()))?;
            let data_type: Option<String> =
                row.try_get(2).map_err(|e| DbError::Schema(e.to_string()))?;

            if current.as_ref().map(|t| t.name.as_str()) != Some(table.as_str()) {
                if let Some(done) = current.take() {
                    snapshot.push(done);
                }
                current = Some(TableSchema::new(table));
            }
            if let (Some(entry), Some(column), Some(data_type)) =
                (current.as_mut(), column, data_type)
            {
                entry.columns.push(ColumnSchema {
                    name: column,
                    data_type,
                });
            }
        }
        if let Some(done) = current {
            snapshot.push(done);
        }

        debug!(tables = snapshot.len(), "schema loaded");
        Ok(snapshot)
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        let client = self.client().await?;

        // Preparing rejects multi-statement input and tells us the column types.
        let statement = client.prepare(sql).await.map_err(query_error)?;
        let messages = client.simple_query(sql).await.map_err(query_error)?;

        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                rows.push(encode_row(statement.columns(), &row)?);
            }
        }
        Ok(rows)
    }
}

fn encode_row(columns: &[Column], row: &SimpleQueryRow) -> Result<Row, DbError> {
    let mut encoded = Row::new();
    for (idx, column) in columns.iter().enumerate() {
        let text = row
            .try_get(idx)
            .map_err(|e| DbError::Query(e.to_string()))?;
        encoded.insert(
            column.name().to_string(),
            encode_text_value(column.type_(), text),
        );
    }
    Ok(encoded)
}

fn query_error(err: tokio_postgres::Error) -> DbError {
    match err.as_db_error() {
        Some(db) => DbError::Query(db.message().to_string()),
        None if err.is_closed() => DbError::Connect(err.to_string()),
        None => DbError::Query(err.to_string()),
    }
}
