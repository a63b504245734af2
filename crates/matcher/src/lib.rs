//! # NLQ Matcher (`matcher`)
//!
//! ## Purpose
//!
//! Decides whether a query is one of the catalog's known intents. The query is
//! embedded, compared by cosine similarity with every template description,
//! and the best-scoring template is checked against the parameters the
//! extractor found.
//!
//! ## Core Types
//!
//! - [`SemanticMatcher`]: owns the embedder handle, the catalog and the
//!   one-time template-vector cache.
//! - [`MatchConfig`]: the similarity threshold (strictly-greater-than, 0.5 by
//!   default).
//! - [`MatchOutcome`]: `Matched`, `BelowThreshold` or `MissingParameters`, the
//!   last two carrying the message the fallback path swallows.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use catalog::TemplateCatalog;
//! use extract::extract;
//! use matcher::{MatchConfig, SemanticMatcher};
//! use semantic::StubEmbedder;
//!
//! let matcher = SemanticMatcher::new(
//!     Arc::new(StubEmbedder::new(384, true)),
//!     Arc::new(TemplateCatalog::retail()),
//!     MatchConfig::default(),
//! )?;
//! matcher.warm_up()?;
//!
//! let query = extract("Show all pending orders");
//! let outcome = matcher.match_query(&query.normalized, &query.params)?;
//! assert_eq!(outcome.candidate().id, "pending_orders");
//! # Ok::<(), matcher::MatchError>(())
//! ```

mod engine;
mod similarity;
mod types;

pub use crate::engine::SemanticMatcher;
pub use crate::similarity::{argmax, cosine_similarity};
pub use crate::types::{
    Candidate, MatchConfig, MatchError, MatchOutcome, DEFAULT_SIMILARITY_THRESHOLD,
    NO_MATCH_MESSAGE,
};
