//! Workspace umbrella crate for the NLQ natural-language-to-SQL engine.
//!
//! [`NlqEngine`] ties the stages together: parameter extraction, semantic
//! template matching, rendering, and the keyword fallback planner. One engine
//! is built at process start and shared by every request; it owns the loaded
//! embedding model and the cached template vectors.
//!
//! ```
//! use std::sync::Arc;
//! use nlq::{EngineConfig, GenerationSource, NlqEngine, SchemaSnapshot, StubEmbedder};
//!
//! let engine = NlqEngine::new(&EngineConfig::default(), Arc::new(StubEmbedder::new(384, true)))?;
//! engine.warm_up()?;
//!
//! let schema = SchemaSnapshot::from_table_names(["customers", "orders", "products"]);
//! let generated = engine.generate_sql("Show all pending orders", &schema)?;
//! assert!(matches!(generated.source, GenerationSource::Template { index: 0, .. }));
//! # Ok::<(), nlq::NlqError>(())
//! ```

pub mod config;

pub use crate::config::{ConfigLoadError, EngineConfig};
pub use catalog::{render, CatalogError, RenderError, Template, TemplateCatalog};
pub use extract::{extract, normalize_query, Category, ExtractedQuery, ParamValue, ParameterBag};
pub use matcher::{
    Candidate, MatchConfig, MatchError, MatchOutcome, SemanticMatcher,
    DEFAULT_SIMILARITY_THRESHOLD, NO_MATCH_MESSAGE,
};
pub use planner::{
    ColumnSchema, FallbackPlan, KeywordPlanner, PlanError, SchemaSnapshot, TableChoice,
    TableSchema,
};
pub use semantic::{
    load_embedder, Embedder, EmbeddingMode, OnnxEmbedder, SemanticConfig, SemanticError,
    StubEmbedder,
};

use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by the engine.
///
/// Failed or incomplete template matches are not errors: the fallback planner
/// absorbs them. Only [`NlqError::NoQueryProvided`] and
/// [`NlqError::GenerationFailure`] come out of [`NlqEngine::generate_sql`];
/// the rest are startup failures.
#[derive(Debug, Error)]
pub enum NlqError {
    #[error("No query provided")]
    NoQueryProvided,
    #[error("Could not generate SQL: {0}")]
    GenerationFailure(String),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("embedding provider error: {0}")]
    Embedding(#[from] SemanticError),
    #[error("matcher error: {0}")]
    Matcher(#[from] MatchError),
}

/// Which path produced the SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationSource {
    /// A catalog template, rendered with the extracted parameters.
    Template { index: usize, id: String, score: f32 },
    /// The keyword planner. `reason` keeps the message of the template match
    /// it replaced, if there was one.
    Fallback {
        table: String,
        reason: Option<String>,
    },
}

impl GenerationSource {
    pub fn is_template(&self) -> bool {
        matches!(self, GenerationSource::Template { .. })
    }
}

/// SQL for one question plus how it was arrived at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSql {
    pub sql: String,
    pub source: GenerationSource,
    pub params: ParameterBag,
    pub normalized_query: String,
}

/// Metrics observer for SQL generation.
pub trait GenerationMetrics: Send + Sync {
    fn record_generation(&self, latency: Duration, result: Result<&GenerationSource, &NlqError>);
}

/// Install or clear the global generation metrics recorder.
pub fn set_generation_metrics(recorder: Option<Arc<dyn GenerationMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn GenerationMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn GenerationMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn GenerationMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn GenerationMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record(self, result: &Result<GeneratedSql, NlqError>) {
        let result = result.as_ref().map(|generated| &generated.source);
        self.recorder
            .record_generation(self.start.elapsed(), result);
    }
}

/// Shared generation context: matcher (with its embedder and template cache)
/// plus the fallback planner.
pub struct NlqEngine {
    matcher: SemanticMatcher,
    planner: KeywordPlanner,
}

impl NlqEngine {
    /// Builds an engine around an already loaded embedder.
    pub fn new(config: &EngineConfig, embedder: Arc<dyn Embedder>) -> Result<Self, NlqError> {
        config.validate()?;
        let catalog = Arc::new(config.catalog()?);
        let matcher = SemanticMatcher::new(embedder, catalog, config.match_config())?;
        Ok(Self::from_parts(
            matcher,
            KeywordPlanner::new(config.fallback_row_limit),
        ))
    }

    pub fn from_parts(matcher: SemanticMatcher, planner: KeywordPlanner) -> Self {
        Self { matcher, planner }
    }

    /// Loads the embedding provider described by `config.semantic` and warms
    /// the template cache.
    ///
    /// A failed warm-up is logged and left for the first query to retry.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, NlqError> {
        config.validate()?;
        let embedder = load_embedder(&config.semantic).await?;
        let engine = Self::new(config, embedder)?;
        match engine.warm_up() {
            Ok(()) => info!(
                templates = engine.catalog().len(),
                model = engine.matcher.embedder().model_name(),
                "nlq engine ready"
            ),
            Err(err) => warn!(error = %err, "template warm-up failed; will retry on first query"),
        }
        Ok(engine)
    }

    /// Encodes the catalog descriptions now rather than on the first query.
    pub fn warm_up(&self) -> Result<(), NlqError> {
        Ok(self.matcher.warm_up()?)
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        self.matcher.catalog()
    }

    pub fn matcher(&self) -> &SemanticMatcher {
        &self.matcher
    }

    pub fn planner(&self) -> &KeywordPlanner {
        &self.planner
    }

    /// Turns a question into SQL.
    ///
    /// A template is used when the best match clears the threshold and every
    /// parameter it declares was extracted. In every other case, including an
    /// embedding failure, the keyword planner answers instead and the reason is
    /// kept in [`GenerationSource::Fallback`].
    pub fn generate_sql(
        &self,
        raw_query: &str,
        schema: &SchemaSnapshot,
    ) -> Result<GeneratedSql, NlqError> {
        let metrics = MetricsSpan::start();
        let result = self.generate(raw_query, schema);
        if let Some(span) = metrics {
            span.record(&result);
        }
        result
    }

    fn generate(&self, raw_query: &str, schema: &SchemaSnapshot) -> Result<GeneratedSql, NlqError> {
        if raw_query.trim().is_empty() {
            return Err(NlqError::NoQueryProvided);
        }

        let ExtractedQuery { normalized, params } = extract(raw_query);
        debug!(normalized = %normalized, params = params.len(), "extracted query");

        let reason = match self.matcher.match_query(&normalized, &params) {
            Ok(MatchOutcome::Matched(candidate)) => {
                match self.render_candidate(&candidate, &params) {
                    Ok(sql) => {
                        debug!(index = candidate.index, id = %candidate.id, score = candidate.score, "template rendered");
                        return Ok(GeneratedSql {
                            sql,
                            source: GenerationSource::Template {
                                index: candidate.index,
                                id: candidate.id,
                                score: candidate.score,
                            },
                            params,
                            normalized_query: normalized,
                        });
                    }
                    Err(err) => {
                        warn!(id = %candidate.id, error = %err, "template render failed, using fallback");
                        Some(err)
                    }
                }
            }
            Ok(outcome) => outcome.rejection(),
            Err(err) => {
                warn!(error = %err, "semantic match failed, using fallback");
                Some(err.to_string())
            }
        };

        let plan = self
            .planner
            .plan(&normalized, schema)
            .map_err(|err| NlqError::GenerationFailure(err.to_string()))?;
        debug!(table = %plan.table, choice = ?plan.choice, "fallback plan");

        Ok(GeneratedSql {
            sql: plan.sql,
            source: GenerationSource::Fallback {
                table: plan.table,
                reason,
            },
            params,
            normalized_query: normalized,
        })
    }

    fn render_candidate(
        &self,
        candidate: &Candidate,
        params: &ParameterBag,
    ) -> Result<String, String> {
        let template = self
            .matcher
            .catalog()
            .get(candidate.index)
            .map_err(|e| e.to_string())?;
        render(template, params).map_err(|e| e.to_string())
    }
}
