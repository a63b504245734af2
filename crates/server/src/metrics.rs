//! Prometheus wiring for the `metrics` facade.

use std::time::Duration;

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use nlq::{GenerationMetrics, GenerationSource, NlqError};

pub const GENERATIONS_TOTAL: &str = "nlq_generations_total";
pub const GENERATION_SECONDS: &str = "nlq_generation_seconds";
pub const QUERIES_TOTAL: &str = "nlq_queries_total";
pub const ROWS_RETURNED: &str = "nlq_rows_returned";

/// Installs the process-wide Prometheus recorder.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Forwards engine generation events to the `metrics` facade.
#[derive(Debug, Default)]
pub struct PrometheusGenerationMetrics;

impl GenerationMetrics for PrometheusGenerationMetrics {
    fn record_generation(&self, latency: Duration, result: Result<&GenerationSource, &NlqError>) {
        let path = match result {
            Ok(GenerationSource::Template { .. }) => "template",
            Ok(GenerationSource::Fallback { .. }) => "fallback",
            Err(NlqError::NoQueryProvided) => "empty",
            Err(_) => "failure",
        };
        counter!(GENERATIONS_TOTAL, "path" => path).increment(1);
        histogram!(GENERATION_SECONDS, "path" => path).record(latency.as_secs_f64());
    }
}

/// Counts one `/api/query` outcome.
pub fn record_query(status: &'static str, rows: Option<usize>) {
    counter!(QUERIES_TOTAL, "status" => status).increment(1);
    if let Some(rows) = rows {
        histogram!(ROWS_RETURNED).record(rows as f64);
    }
}
