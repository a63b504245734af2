use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlanError;
use crate::schema::SchemaSnapshot;

pub const DEFAULT_ROW_LIMIT: u32 = 100;
pub const DEFAULT_TABLE: &str = "products";

/// Keyword groups tried in order when no schema table is named outright.
pub const KEYWORD_GROUPS: &[(&[&str], &str)] = &[
    (&["order", "purchase"], "orders"),
    (&["item", "product"], "products"),
    (&["stock", "inventory"], "inventory"),
    (&["customer", "client"], "customers"),
];

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").expect("identifier pattern is valid"));

/// How the target table was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableChoice {
    /// A schema table (or its singular form) appeared among the keywords.
    SchemaMatch,
    /// A heuristic keyword group fired on `keyword`.
    KeywordGroup { keyword: String },
    /// Nothing matched.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPlan {
    pub table: String,
    pub sql: String,
    pub choice: TableChoice,
    pub keywords: Vec<String>,
}

/// Picks a single table for a query and scans it with a row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordPlanner {
    row_limit: u32,
}

impl Default for KeywordPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_LIMIT)
    }
}

impl KeywordPlanner {
    pub fn new(row_limit: u32) -> Self {
        Self { row_limit }
    }

    pub fn row_limit(&self) -> u32 {
        self.row_limit
    }

    /// Builds `SELECT * FROM <table> LIMIT <row_limit>` for `normalized_query`.
    ///
    /// Table choice, first hit wins:
    /// 1. the first schema table whose name, or name minus one trailing `s`,
    ///    is a keyword;
    /// 2. the first [`KEYWORD_GROUPS`] entry with a member among the keywords;
    /// 3. [`DEFAULT_TABLE`].
    ///
    /// The only failure is a chosen name that is not a plain identifier, which
    /// is refused rather than spliced into SQL.
    pub fn plan(
        &self,
        normalized_query: &str,
        schema: &SchemaSnapshot,
    ) -> Result<FallbackPlan, PlanError> {
        let keywords = extract::keywords(normalized_query);
        let has = |word: &str| keywords.iter().any(|keyword| keyword == word);

        let schema_hit = schema.table_names().find(|table| {
            let singular = table.strip_suffix('s').unwrap_or(table);
            has(singular) || has(table)
        });

        let (table, choice) = if let Some(table) = schema_hit {
            (table.to_string(), TableChoice::SchemaMatch)
        } else if let Some((keyword, table)) = KEYWORD_GROUPS.iter().find_map(|(words, table)| {
            words
                .iter()
                .find(|word| has(word))
                .map(|word| ((*word).to_string(), *table))
        }) {
            (table.to_string(), TableChoice::KeywordGroup { keyword })
        } else {
            (DEFAULT_TABLE.to_string(), TableChoice::Default)
        };

        if !IDENTIFIER.is_match(&table) {
            return Err(PlanError::InvalidTableName(table));
        }

        let sql = format!("SELECT * FROM {table} LIMIT {}", self.row_limit);
        debug!(%table, ?choice, ?keywords, "fallback table chosen");
        Ok(FallbackPlan {
            table,
            sql,
            choice,
            keywords,
        })
    }
}
