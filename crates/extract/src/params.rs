use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameter names produced by the extraction rules. Templates refer to the
/// same names through `{name}` placeholders.
pub mod keys {
    pub const CUSTOMER_LAST_NAME: &str = "customer_last_name";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const MIN_PRICE: &str = "min_price";
    pub const THRESHOLD: &str = "threshold";
    pub const CATEGORY: &str = "category";
}

/// Closed set of product categories recognized in queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Audio,
    Kitchen,
    Footwear,
    Furniture,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Audio,
        Category::Kitchen,
        Category::Footwear,
        Category::Furniture,
    ];

    /// Canonical spelling, as stored in the `products.category` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Audio => "Audio",
            Category::Kitchen => "Kitchen",
            Category::Footwear => "Footwear",
            Category::Furniture => "Furniture",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value pulled out of query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for ParamValue {
    /// Strings are written verbatim. Whole floats keep one decimal place
    /// (`50.0`), matching how the SQL templates have always been filled.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.write_str(text),
            ParamValue::Integer(value) => write!(f, "{value}"),
            ParamValue::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
        }
    }
}

/// Mapping from parameter name to extracted value. Keys are present only when
/// a rule fired; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterBag {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Names from `required` that are absent, in the order given.
    pub fn missing<'a, S>(&self, required: &'a [S]) -> Vec<&'a str>
    where
        S: AsRef<str>,
    {
        required
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.contains(name))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, ParamValue)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}
