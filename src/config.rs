//! YAML configuration for the NLQ engine.
//!
//! Everything the engine needs at construction time lives in one file:
//! matcher threshold, fallback row limit, embedding provider settings and,
//! optionally, a replacement template catalog.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! similarity_threshold: 0.5
//! fallback_row_limit: 100
//!
//! semantic:
//!   mode: "onnx"
//!   model_name: "all-MiniLM-L6-v2"
//!   model_path: "./models/all-MiniLM-L6-v2/onnx/model.onnx"
//!   tokenizer_path: "./models/all-MiniLM-L6-v2/tokenizer.json"
//!   fallback_to_stub: true
//!
//! # Omit to use the built-in retail catalog.
//! templates:
//!   - id: "pending_orders"
//!     description: "Show all pending orders"
//!     sql: "SELECT * FROM orders WHERE status = 'pending'"
//! ```

use std::fs;
use std::path::Path;

use catalog::{CatalogError, Template, TemplateCatalog};
use matcher::{MatchConfig, DEFAULT_SIMILARITY_THRESHOLD};
use planner::DEFAULT_ROW_LIMIT;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid template catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// A template is used only when its cosine score is strictly above this.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,

    /// `LIMIT` applied by the keyword fallback planner.
    #[serde(default = "default_row_limit")]
    pub fallback_row_limit: u32,

    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Replaces the built-in retail catalog when present. Order matters:
    /// ties between equally similar templates go to the earlier entry.
    #[serde(default)]
    pub templates: Option<Vec<Template>>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_row_limit() -> u32 {
    DEFAULT_ROW_LIMIT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            similarity_threshold: default_threshold(),
            fallback_row_limit: default_row_limit(),
            semantic: SemanticConfig::default(),
            templates: None,
        }
    }
}

impl EngineConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.match_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        if self.fallback_row_limit == 0 {
            return Err(ConfigLoadError::Validation(
                "fallback_row_limit must be > 0".to_string(),
            ));
        }

        self.semantic
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        if let Some(templates) = &self.templates {
            TemplateCatalog::from_templates(templates.clone())?;
        }

        Ok(())
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig::with_threshold(self.similarity_threshold)
    }

    /// The configured catalog, or the built-in retail one.
    pub fn catalog(&self) -> Result<TemplateCatalog, ConfigLoadError> {
        match &self.templates {
            Some(templates) => Ok(TemplateCatalog::from_templates(templates.clone())?),
            None => Ok(TemplateCatalog::retail()),
        }
    }
}
