use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::normalize_query;
use crate::params::{keys, Category, ParamValue, ParameterBag};

static CUSTOMER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"customer (\w+)").expect("customer pattern is valid"));
static PRODUCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"product (\w+)").expect("product pattern is valid"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.?\d*)").expect("number pattern is valid"));
static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+) (item|product|stock)").expect("quantity pattern is valid")
});
static CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Electronics|Audio|Kitchen|Footwear|Furniture)\b")
        .expect("category pattern is valid")
});

/// Result of running the extraction rules over one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedQuery {
    /// Lowercased, punctuation-free query text.
    pub normalized: String,
    pub params: ParameterBag,
}

/// Normalizes `raw` and applies every extraction rule to it.
///
/// The rules are independent: each one looks at the same text and none of them
/// sees what the others captured.
///
/// 1. `customer <word>` stores the title-cased word as `customer_last_name`.
/// 2. `product <word>` stores the word as `product_name`.
/// 3. When the text mentions `price` or `cost` anywhere, the first number in
///    the whole text becomes `min_price`, wherever it sits.
/// 4. `<integer> item|product|stock` stores the integer as `threshold`.
/// 5. A whole-word category name in the original query, matched without regard
///    to case, stores the canonical category spelling as `category`.
pub fn extract(raw: &str) -> ExtractedQuery {
    let normalized = normalize_query(raw);
    let mut params = ParameterBag::new();

    if let Some(caps) = CUSTOMER.captures(&normalized) {
        params.insert(
            keys::CUSTOMER_LAST_NAME,
            ParamValue::Text(title_case(&caps[1])),
        );
    }

    if let Some(caps) = PRODUCT.captures(&normalized) {
        params.insert(keys::PRODUCT_NAME, ParamValue::Text(caps[1].to_string()));
    }

    if normalized.contains("price") || normalized.contains("cost") {
        if let Some(caps) = NUMBER.captures(&normalized) {
            match caps[1].parse::<f64>() {
                Ok(value) => {
                    params.insert(keys::MIN_PRICE, ParamValue::Float(value));
                }
                Err(err) => debug!(literal = &caps[1], %err, "skipping unparseable price"),
            }
        }
    }

    if let Some(caps) = QUANTITY.captures(&normalized) {
        match caps[1].parse::<i64>() {
            Ok(value) => {
                params.insert(keys::THRESHOLD, ParamValue::Integer(value));
            }
            Err(err) => debug!(literal = &caps[1], %err, "skipping unparseable threshold"),
        }
    }

    if let Some(category) = CATEGORY
        .captures(raw)
        .and_then(|caps| Category::from_name(&caps[1]))
    {
        params.insert(keys::CATEGORY, ParamValue::Text(category.as_str().to_string()));
    }

    ExtractedQuery { normalized, params }
}

/// First character uppercased, the rest lowercased.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
