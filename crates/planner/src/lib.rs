//! NLQ keyword fallback planner.
//!
//! When no template matches with confidence, the engine still answers with
//! something: a bounded `SELECT *` over the one table the query most likely
//! refers to. Table choice looks at the live schema first, then a small set
//! of keyword groups, and finally defaults to `products`.
//!
//! ```
//! use planner::{KeywordPlanner, SchemaSnapshot};
//!
//! let schema = SchemaSnapshot::from_table_names(["customers", "orders", "products"]);
//! let plan = KeywordPlanner::default().plan("list every customer", &schema)?;
//! assert_eq!(plan.sql, "SELECT * FROM customers LIMIT 100");
//! # Ok::<(), planner::PlanError>(())
//! ```

mod error;
mod planner;
mod schema;

pub use crate::error::PlanError;
pub use crate::planner::{
    FallbackPlan, KeywordPlanner, TableChoice, DEFAULT_ROW_LIMIT, DEFAULT_TABLE, KEYWORD_GROUPS,
};
pub use crate::schema::{ColumnSchema, SchemaSnapshot, TableSchema};
