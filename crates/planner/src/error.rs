use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("table name `{0}` is not a plain SQL identifier")]
    InvalidTableName(String),
}
