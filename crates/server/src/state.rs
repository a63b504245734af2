use crate::config::ServerConfig;
use crate::db::Database;
use metrics_exporter_prometheus::PrometheusHandle;
use nlq::NlqEngine;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Engine with the loaded embedding model and cached template vectors
    pub engine: Arc<NlqEngine>,

    /// Schema provider and query executor
    pub database: Arc<dyn Database>,

    /// Renders `/metrics`; `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,

    pub started_at: Instant,
}

impl ServerState {
    pub fn new(config: ServerConfig, engine: NlqEngine, database: Arc<dyn Database>) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            database,
            metrics: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
