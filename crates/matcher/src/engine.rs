use std::sync::Arc;

use catalog::TemplateCatalog;
use extract::ParameterBag;
use once_cell::sync::OnceCell;
use semantic::Embedder;
use tracing::{debug, info};

use crate::similarity::{argmax, cosine_similarity};
use crate::types::{Candidate, MatchConfig, MatchError, MatchOutcome};

#[cfg(test)]
mod tests;

/// Scores queries against the catalog and decides whether a template applies.
///
/// Template vectors are computed once, in catalog order, and kept for the
/// life of the matcher. [`warm_up`](Self::warm_up) does this eagerly; otherwise
/// the first query does it. Concurrent first queries wait on a single
/// computation, and a failed computation leaves the cache empty so the next
/// query retries.
pub struct SemanticMatcher {
    embedder: Arc<dyn Embedder>,
    catalog: Arc<TemplateCatalog>,
    config: MatchConfig,
    template_vectors: OnceCell<Vec<Vec<f32>>>,
}

impl SemanticMatcher {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        catalog: Arc<TemplateCatalog>,
        config: MatchConfig,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            embedder,
            catalog,
            config,
            template_vectors: OnceCell::new(),
        })
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Whether template vectors are already cached.
    pub fn is_warm(&self) -> bool {
        self.template_vectors.get().is_some()
    }

    /// Computes the template vectors now instead of on the first query.
    pub fn warm_up(&self) -> Result<(), MatchError> {
        self.template_vectors().map(|_| ())
    }

    fn template_vectors(&self) -> Result<&[Vec<f32>], MatchError> {
        self.template_vectors
            .get_or_try_init(|| {
                let descriptions = self.catalog.descriptions();
                let vectors = self.embedder.encode_batch(&descriptions)?;
                if vectors.len() != descriptions.len() {
                    return Err(MatchError::TemplateCount {
                        expected: descriptions.len(),
                        got: vectors.len(),
                    });
                }
                info!(
                    templates = vectors.len(),
                    model = self.embedder.model_name(),
                    "template embeddings cached"
                );
                Ok(vectors)
            })
            .map(Vec::as_slice)
    }

    /// Cosine similarity of `normalized_query` against every template, in
    /// catalog order.
    pub fn scores(&self, normalized_query: &str) -> Result<Vec<f32>, MatchError> {
        let templates = self.template_vectors()?;
        let query = self.embedder.encode(normalized_query)?;
        templates
            .iter()
            .map(|template| {
                if template.len() != query.len() {
                    return Err(MatchError::DimensionMismatch {
                        query: query.len(),
                        template: template.len(),
                    });
                }
                Ok(cosine_similarity(&query, template))
            })
            .collect()
    }

    /// Picks the best template for `normalized_query` and checks that
    /// `params` supplies everything it needs.
    ///
    /// The best template is the first index holding the maximum score. It is
    /// accepted only if that score is strictly above the threshold; there is
    /// no second choice when it falls short or lacks parameters.
    pub fn match_query(
        &self,
        normalized_query: &str,
        params: &ParameterBag,
    ) -> Result<MatchOutcome, MatchError> {
        let scores = self.scores(normalized_query)?;
        let (index, score) = argmax(&scores).ok_or(MatchError::TemplateCount {
            expected: self.catalog.len(),
            got: 0,
        })?;
        let template = self.catalog.get(index)?;
        let candidate = Candidate {
            index,
            id: template.id.clone(),
            score,
        };
        debug!(index, id = %candidate.id, score, threshold = self.config.threshold, "best template");

        let confident = score > self.config.threshold;
        if !confident {
            return Ok(MatchOutcome::BelowThreshold(candidate));
        }

        let missing: Vec<String> = params
            .missing(&template.parameters)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if !missing.is_empty() {
            return Ok(MatchOutcome::MissingParameters { candidate, missing });
        }

        Ok(MatchOutcome::Matched(candidate))
    }
}
