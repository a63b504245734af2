//! NLQ query text layer.
//!
//! Turns a raw natural-language question into the two things the rest of the
//! engine works with: a normalized query string and a bag of typed parameters.
//!
//! ## What we do
//!
//! - Lowercasing and punctuation removal (every non-word, non-space character
//!   becomes a single space)
//! - Pattern-based extraction of customer names, product names, price and
//!   quantity thresholds, and product categories
//! - Whitespace tokenization with English stopword removal for the keyword
//!   fallback planner
//!
//! ## Invariants worth knowing
//!
//! - Extraction never fails. A rule that does not fire simply leaves its key
//!   out of the [`ParameterBag`]; absence is meaningful downstream.
//! - Every rule sees the same normalized text. Category matching is the one
//!   exception and runs against the original query, case-insensitively.
//! - Pure functions: no I/O, no clock, no locale. Same input, same output.

mod keywords;
mod normalize;
mod params;
mod rules;

pub use crate::keywords::{is_stopword, keywords, tokenize, ENGLISH_STOPWORDS};
pub use crate::normalize::normalize_query;
pub use crate::params::{keys, Category, ParamValue, ParameterBag};
pub use crate::rules::{extract, ExtractedQuery};
