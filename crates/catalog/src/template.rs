use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});
static PARAMETER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("name pattern is valid"));

/// One intent: a natural-language description paired with parameterized SQL.
///
/// `sql` may contain `{name}` placeholders. `parameters` lists every
/// placeholder name exactly once, in the order values are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub description: String,
    pub sql: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        sql: impl Into<String>,
        parameters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, CatalogError> {
        let template = Self {
            id: id.into(),
            description: description.into(),
            sql: sql.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        };
        template.validate()?;
        Ok(template)
    }

    /// Placeholder names found in `sql`, in first-appearance order, deduplicated.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        PLACEHOLDER
            .captures_iter(&self.sql)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Checks that the declared parameters and the placeholders in `sql`
    /// are the same set.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (field, value) in [
            ("id", &self.id),
            ("description", &self.description),
            ("sql", &self.sql),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::EmptyField {
                    template: self.id.clone(),
                    field,
                });
            }
        }

        let mut declared = BTreeSet::new();
        for name in &self.parameters {
            if !PARAMETER_NAME.is_match(name) {
                return Err(CatalogError::InvalidParameterName {
                    template: self.id.clone(),
                    name: name.clone(),
                });
            }
            if !declared.insert(name.as_str()) {
                return Err(CatalogError::DuplicateParameter {
                    template: self.id.clone(),
                    name: name.clone(),
                });
            }
        }

        let used = self.placeholders();
        if let Some(name) = used.iter().find(|name| !declared.contains(*name)) {
            return Err(CatalogError::UndeclaredPlaceholder {
                template: self.id.clone(),
                name: (*name).to_string(),
            });
        }
        if let Some(name) = self
            .parameters
            .iter()
            .find(|name| !used.contains(&name.as_str()))
        {
            return Err(CatalogError::UnusedParameter {
                template: self.id.clone(),
                name: name.clone(),
            });
        }

        Ok(())
    }
}
