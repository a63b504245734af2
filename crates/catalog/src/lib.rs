//! NLQ template catalog.
//!
//! An ordered list of intents, each a natural-language description paired
//! with a SQL string carrying `{name}` placeholders, plus the renderer that
//! fills those placeholders from an extracted [`extract::ParameterBag`].
//!
//! ## Invariants worth knowing
//!
//! - Catalog order is the index space the matcher scores over. Ties go to the
//!   lower index.
//! - Every template's declared parameters equal the placeholder set in its SQL.
//!   [`TemplateCatalog::from_templates`] refuses anything else.
//! - Rendering is plain text substitution. Values are never escaped.

mod catalog;
mod error;
mod render;
mod template;

pub use crate::catalog::TemplateCatalog;
pub use crate::error::{CatalogError, RenderError};
pub use crate::render::render;
pub use crate::template::Template;
