//! API route handlers
//!
//! - `query`: natural-language question in, SQL and rows out
//! - `health`: liveness and Prometheus metrics

pub mod health;
pub mod query;

use crate::error::ServerError;

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
