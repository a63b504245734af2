use thiserror::Error;

/// Errors raised while building or indexing a [`TemplateCatalog`](crate::TemplateCatalog).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("template catalog must contain at least one template")]
    Empty,
    #[error("template index {index} out of range for catalog of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("duplicate template id `{0}`")]
    DuplicateId(String),
    #[error("template `{template}` has an empty {field}")]
    EmptyField {
        template: String,
        field: &'static str,
    },
    #[error("template `{template}` declares `{name}`, which is not a valid parameter name")]
    InvalidParameterName { template: String, name: String },
    #[error("template `{template}` declares parameter `{name}` more than once")]
    DuplicateParameter { template: String, name: String },
    #[error("template `{template}` uses placeholder `{{{name}}}` without declaring it")]
    UndeclaredPlaceholder { template: String, name: String },
    #[error("template `{template}` declares parameter `{name}` but never uses it")]
    UnusedParameter { template: String, name: String },
}

/// Errors raised while filling a template's placeholders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("template `{template}` requires parameter `{name}`")]
    MissingParameter { template: String, name: String },
}
