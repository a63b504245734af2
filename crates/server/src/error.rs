use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nlq::NlqError;
use serde::{Deserialize, Serialize};

use crate::db::DbError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// Anything a client can cause, including SQL that fails to execute, is a
/// 400 with a one-line message.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] NlqError),

    #[error("Error executing query: {0}")]
    Execution(String),

    #[error("Database unavailable: {0}")]
    Database(String),

    #[error("Metrics are disabled")]
    MetricsDisabled,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// API error body: `{"error": "<message>"}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::Execution(_) => StatusCode::BAD_REQUEST,
            ServerError::Engine(NlqError::NoQueryProvided | NlqError::GenerationFailure(_)) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::NotFound | ServerError::MetricsDisabled => StatusCode::NOT_FOUND,
            ServerError::Engine(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<DbError> for ServerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Query(message) => ServerError::Execution(message),
            other => ServerError::Database(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("generation task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_keep_their_wording() {
        let err = ServerError::from(NlqError::NoQueryProvided);
        assert_eq!(err.to_string(), "No query provided");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ServerError::from(NlqError::GenerationFailure("bad table".into()));
        assert_eq!(err.to_string(), "Could not generate SQL: bad table");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn query_failures_are_client_errors() {
        let err = ServerError::from(DbError::Query("relation \"x\" does not exist".into()));
        assert_eq!(
            err.to_string(),
            "Error executing query: relation \"x\" does not exist"
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn connection_failures_are_server_errors() {
        let err = ServerError::from(DbError::Connect("refused".into()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
