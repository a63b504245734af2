use catalog::CatalogError;
use semantic::SemanticError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;

/// Message reported when the best score does not clear the threshold.
pub const NO_MATCH_MESSAGE: &str = "Could not match your query to any known patterns.";

/// Matcher tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// A template is accepted only when its score is strictly greater than this.
    pub threshold: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl MatchConfig {
    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.threshold.is_finite() || !(-1.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::InvalidConfig(format!(
                "threshold must be within [-1, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Highest-scoring template for a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub id: String,
    pub score: f32,
}

/// Result of matching one query against the catalog.
///
/// Only [`MatchOutcome::Matched`] may be rendered. The other two variants are
/// recoverable: the caller falls back to keyword planning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched(Candidate),
    BelowThreshold(Candidate),
    MissingParameters {
        candidate: Candidate,
        missing: Vec<String>,
    },
}

impl MatchOutcome {
    pub fn candidate(&self) -> &Candidate {
        match self {
            MatchOutcome::Matched(candidate)
            | MatchOutcome::BelowThreshold(candidate)
            | MatchOutcome::MissingParameters { candidate, .. } => candidate,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    /// User-facing reason a template was not used, if any.
    pub fn rejection(&self) -> Option<String> {
        match self {
            MatchOutcome::Matched(_) => None,
            MatchOutcome::BelowThreshold(_) => Some(NO_MATCH_MESSAGE.to_string()),
            MatchOutcome::MissingParameters { missing, .. } => {
                Some(format!("Missing parameters: {}", missing.join(", ")))
            }
        }
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("embedder returned {got} template vectors for {expected} templates")]
    TemplateCount { expected: usize, got: usize },
    #[error("query vector has {query} dimensions but template vectors have {template}")]
    DimensionMismatch { query: usize, template: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate {
            index: 1,
            id: "customer_orders".into(),
            score: 0.8,
        }
    }

    #[test]
    fn default_threshold_is_half() {
        assert_eq!(MatchConfig::default().threshold, 0.5);
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn threshold_outside_cosine_range_is_rejected() {
        for bad in [1.5, -1.01, f32::NAN, f32::INFINITY] {
            match MatchConfig::with_threshold(bad).validate() {
                Err(MatchError::InvalidConfig(msg)) => assert!(msg.contains("threshold")),
                other => panic!("expected invalid config for {bad}, got {other:?}"),
            }
        }
        assert!(MatchConfig::with_threshold(-1.0).validate().is_ok());
        assert!(MatchConfig::with_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(MatchOutcome::Matched(candidate()).rejection(), None);
        assert_eq!(
            MatchOutcome::BelowThreshold(candidate()).rejection().as_deref(),
            Some("Could not match your query to any known patterns.")
        );
        let missing = MatchOutcome::MissingParameters {
            candidate: candidate(),
            missing: vec!["customer_last_name".into(), "category".into()],
        };
        assert_eq!(
            missing.rejection().as_deref(),
            Some("Missing parameters: customer_last_name, category")
        );
        assert_eq!(missing.candidate().index, 1);
        assert!(!missing.is_match());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(MatchOutcome::Matched(candidate())).unwrap();
        assert_eq!(json["outcome"], "matched");
        assert_eq!(json["id"], "customer_orders");
    }
}
