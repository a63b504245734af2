use super::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use catalog::Template;
use extract::{keys, ParamValue};
use semantic::{SemanticError, StubEmbedder};

use crate::types::NO_MATCH_MESSAGE;

/// Returns a fixed vector per known text and `fallback` for everything else.
struct MapEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    batch_calls: AtomicUsize,
    failures_left: AtomicUsize,
}

impl MapEmbedder {
    fn new(entries: &[(&str, &[f32])], fallback: &[f32]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                .collect(),
            fallback: fallback.to_vec(),
            batch_calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
        }
    }

    fn failing_first(self, failures: usize) -> Self {
        self.failures_left.store(failures, Ordering::SeqCst);
        self
    }

    fn lookup(&self, text: &str) -> Vec<f32> {
        self.vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Embedder for MapEmbedder {
    fn model_name(&self) -> &str {
        "map"
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.fallback.len())
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SemanticError::Inference("model not ready".into()));
        }
        Ok(texts.iter().map(|text| self.lookup(text)).collect())
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(self.lookup(text))
    }
}

fn catalog_of(templates: &[(&str, &str, &str, &[&str])]) -> Arc<TemplateCatalog> {
    let templates = templates
        .iter()
        .map(|(id, description, sql, params)| {
            Template::new(*id, *description, *sql, params.iter().copied()).unwrap()
        })
        .collect();
    Arc::new(TemplateCatalog::from_templates(templates).unwrap())
}

fn two_template_catalog() -> Arc<TemplateCatalog> {
    catalog_of(&[
        ("alpha", "alpha intent", "SELECT 1", &[]),
        ("beta", "beta intent", "SELECT 2", &[]),
    ])
}

fn matcher_with(
    embedder: Arc<dyn Embedder>,
    catalog: Arc<TemplateCatalog>,
    threshold: f32,
) -> SemanticMatcher {
    SemanticMatcher::new(embedder, catalog, MatchConfig::with_threshold(threshold)).unwrap()
}

#[test]
fn score_exactly_at_threshold_does_not_match() {
    let embedder = Arc::new(MapEmbedder::new(
        &[
            ("alpha intent", &[1.0, 1.0, 0.0, 0.0]),
            ("beta intent", &[0.0, 0.0, 0.0, 1.0]),
            ("half way", &[1.0, 0.0, 1.0, 0.0]),
        ],
        &[0.0, 0.0, 0.0, 0.0],
    ));
    let matcher = matcher_with(embedder, two_template_catalog(), 0.5);

    let outcome = matcher.match_query("half way", &ParameterBag::new()).unwrap();
    assert_eq!(
        outcome,
        MatchOutcome::BelowThreshold(Candidate {
            index: 0,
            id: "alpha".into(),
            score: 0.5,
        })
    );
    assert_eq!(outcome.rejection().as_deref(), Some(NO_MATCH_MESSAGE));
}

#[test]
fn score_just_above_threshold_matches() {
    let embedder = Arc::new(MapEmbedder::new(
        &[
            ("alpha intent", &[1.0, 1.0, 0.0, 0.0]),
            ("beta intent", &[0.0, 0.0, 0.0, 1.0]),
            ("half way", &[1.0, 0.0, 1.0, 0.0]),
        ],
        &[0.0, 0.0, 0.0, 0.0],
    ));
    let matcher = matcher_with(embedder, two_template_catalog(), 0.49);

    let outcome = matcher.match_query("half way", &ParameterBag::new()).unwrap();
    assert!(outcome.is_match());
    assert_eq!(outcome.candidate().id, "alpha");
}

#[test]
fn ties_go_to_the_earliest_template() {
    let catalog = catalog_of(&[
        ("first", "first intent", "SELECT 1", &[]),
        ("second", "second intent", "SELECT 2", &[]),
        ("third", "third intent", "SELECT 3", &[]),
    ]);
    let embedder = Arc::new(MapEmbedder::new(
        &[
            ("first intent", &[0.0, 1.0]),
            ("second intent", &[1.0, 0.0]),
            ("third intent", &[1.0, 0.0]),
            ("query", &[1.0, 0.0]),
        ],
        &[0.0, 0.0],
    ));
    let matcher = matcher_with(embedder, catalog, 0.5);

    let outcome = matcher.match_query("query", &ParameterBag::new()).unwrap();
    assert_eq!(outcome.candidate().index, 1);
    assert_eq!(outcome.candidate().id, "second");
    assert!(outcome.is_match());
}

#[test]
fn matched_template_with_missing_parameters_is_rejected() {
    let retail = Arc::new(TemplateCatalog::retail());
    let mut entries: Vec<(&str, &[f32])> = Vec::new();
    let axes: [&[f32]; 7] = [
        &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        &[0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    ];
    let descriptions = retail.descriptions();
    for (description, axis) in descriptions.iter().zip(axes) {
        entries.push((*description, axis));
    }
    entries.push(("orders for customer", axes[1]));
    let embedder = Arc::new(MapEmbedder::new(&entries, &[0.0; 7]));
    let matcher = matcher_with(embedder, retail.clone(), 0.5);

    let outcome = matcher
        .match_query("orders for customer", &ParameterBag::new())
        .unwrap();
    assert_eq!(
        outcome,
        MatchOutcome::MissingParameters {
            candidate: Candidate {
                index: 1,
                id: "customer_orders".into(),
                score: 1.0,
            },
            missing: vec![keys::CUSTOMER_LAST_NAME.to_string()],
        }
    );
    assert_eq!(
        outcome.rejection().as_deref(),
        Some("Missing parameters: customer_last_name")
    );

    let mut params = ParameterBag::new();
    params.insert(keys::CUSTOMER_LAST_NAME, ParamValue::Text("Smith".into()));
    let outcome = matcher.match_query("orders for customer", &params).unwrap();
    assert!(outcome.is_match());
}

#[test]
fn unrelated_parameters_do_not_satisfy_requirements() {
    let catalog = catalog_of(&[(
        "by_category",
        "products in a category",
        "SELECT * FROM products WHERE category = '{category}'",
        &["category"],
    )]);
    let embedder = Arc::new(MapEmbedder::new(
        &[("products in a category", &[1.0, 0.0])],
        &[1.0, 0.0],
    ));
    let matcher = matcher_with(embedder, catalog, 0.5);
    let mut params = ParameterBag::new();
    params.insert(keys::THRESHOLD, ParamValue::Integer(3));

    let outcome = matcher.match_query("anything", &params).unwrap();
    assert!(matches!(
        outcome,
        MatchOutcome::MissingParameters { ref missing, .. } if missing == &vec!["category".to_string()]
    ));
}

#[test]
fn matching_is_deterministic() {
    let stub: Arc<dyn Embedder> = Arc::new(StubEmbedder::new(384, true));
    let matcher = matcher_with(stub, Arc::new(TemplateCatalog::retail()), 0.5);

    let first = matcher.scores("show all pending orders").unwrap();
    let second = matcher.scores("show all pending orders").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 7);

    let a = matcher.match_query("list all customers", &ParameterBag::new()).unwrap();
    let b = matcher.match_query("list all customers", &ParameterBag::new()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn stub_embedder_matches_verbatim_descriptions() {
    let stub: Arc<dyn Embedder> = Arc::new(StubEmbedder::new(384, true));
    let matcher = matcher_with(stub, Arc::new(TemplateCatalog::retail()), 0.5);

    let outcome = matcher
        .match_query("show all pending orders", &ParameterBag::new())
        .unwrap();
    assert_eq!(outcome.candidate().id, "pending_orders");
    assert!(outcome.is_match());
}

#[test]
fn template_vectors_are_computed_once_under_concurrency() {
    let embedder = Arc::new(MapEmbedder::new(
        &[("alpha intent", &[1.0, 0.0]), ("beta intent", &[0.0, 1.0])],
        &[1.0, 0.0],
    ));
    let matcher = matcher_with(embedder.clone(), two_template_catalog(), 0.5);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let outcome = matcher.match_query("q", &ParameterBag::new()).unwrap();
                assert_eq!(outcome.candidate().id, "alpha");
            });
        }
    });

    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    assert!(matcher.is_warm());
}

#[test]
fn warm_up_fills_the_cache_eagerly() {
    let embedder = Arc::new(MapEmbedder::new(&[], &[1.0, 0.0]));
    let matcher = matcher_with(embedder.clone(), two_template_catalog(), 0.5);
    assert!(!matcher.is_warm());

    matcher.warm_up().unwrap();
    assert!(matcher.is_warm());
    matcher.match_query("q", &ParameterBag::new()).unwrap();
    matcher.warm_up().unwrap();
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_initialization_is_retried() {
    let embedder = Arc::new(MapEmbedder::new(&[], &[1.0, 0.0]).failing_first(1));
    let matcher = matcher_with(embedder.clone(), two_template_catalog(), 0.5);

    let err = matcher.match_query("q", &ParameterBag::new()).unwrap_err();
    assert!(matches!(err, MatchError::Semantic(_)));
    assert!(!matcher.is_warm());

    let outcome = matcher.match_query("q", &ParameterBag::new()).unwrap();
    assert!(outcome.is_match());
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn dimension_mismatch_is_an_error() {
    let embedder = Arc::new(MapEmbedder::new(&[("q", &[1.0, 0.0, 0.0])], &[1.0, 0.0]));
    let matcher = matcher_with(embedder, two_template_catalog(), 0.5);

    let err = matcher.match_query("q", &ParameterBag::new()).unwrap_err();
    assert!(matches!(
        err,
        MatchError::DimensionMismatch {
            query: 3,
            template: 2
        }
    ));
}

#[test]
fn short_template_batch_is_an_error() {
    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn model_name(&self) -> &str {
            "short"
        }

        fn dimension(&self) -> Option<usize> {
            Some(1)
        }

        fn encode_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
            Ok(vec![vec![1.0]])
        }
    }

    let matcher = matcher_with(Arc::new(ShortEmbedder), two_template_catalog(), 0.5);
    assert!(matches!(
        matcher.warm_up(),
        Err(MatchError::TemplateCount {
            expected: 2,
            got: 1
        })
    ));
}

#[test]
fn invalid_threshold_is_rejected_at_construction() {
    let stub: Arc<dyn Embedder> = Arc::new(StubEmbedder::new(8, true));
    let result = SemanticMatcher::new(
        stub,
        Arc::new(TemplateCatalog::retail()),
        MatchConfig::with_threshold(2.0),
    );
    assert!(matches!(result, Err(MatchError::InvalidConfig(_))));
}
