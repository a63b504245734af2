use crate::db::Row;
use crate::error::{ServerError, ServerResult};
use crate::metrics::record_query;
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use nlq::NlqError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const NO_ROWS_MESSAGE: &str = "No information available for your query.";

/// Request body for `POST /api/query`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequest {
    /// Missing and `null` both count as no query.
    #[serde(default)]
    pub query: Option<String>,
}

/// Response body for `POST /api/query`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Vec<Row>,
}

/// Answer a natural-language question.
///
/// Reads the live schema, generates SQL on a blocking thread (embedding is
/// CPU bound), runs it and returns the rows. An empty result carries
/// [`NO_ROWS_MESSAGE`].
pub async fn process_query(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ServerResult<Json<QueryResponse>> {
    let result = answer(&state, payload).await;
    let status = match &result {
        Ok(_) => "ok",
        Err(err) if err.status_code().is_client_error() => "rejected",
        Err(_) => "error",
    };
    record_query(
        status,
        result.as_ref().ok().map(|Json(response)| response.data.len()),
    );
    result
}

async fn answer(
    state: &ServerState,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ServerResult<Json<QueryResponse>> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let query = request.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(NlqError::NoQueryProvided.into());
    }

    let schema = state.database.schema().await?;

    let engine = Arc::clone(&state.engine);
    let question = query.clone();
    let generated =
        tokio::task::spawn_blocking(move || engine.generate_sql(&question, &schema)).await??;

    tracing::info!(
        sql = %generated.sql,
        source = ?generated.source,
        "Executing SQL"
    );
    let data = state.database.execute(&generated.sql).await?;

    let message = data.is_empty().then(|| NO_ROWS_MESSAGE.to_string());
    Ok(Json(QueryResponse {
        question: query,
        sql: generated.sql,
        message,
        data,
    }))
}
