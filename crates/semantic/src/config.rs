use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SemanticError;

/// Which backend produces vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Local sentence-transformer exported to ONNX.
    #[default]
    Onnx,
    /// Deterministic hashed bag-of-words vectors; no model files needed.
    Stub,
}

/// Runtime configuration describing which model/tokenizer to use and how to post-process vectors.
///
/// # Example
/// ```
/// use semantic::{EmbeddingMode, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: EmbeddingMode::Stub,
///     stub_dim: 64,
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    pub mode: EmbeddingMode,
    /// Friendly label for logs and health output.
    pub model_name: String,
    /// Local path where the ONNX file should live (also used as the download target when
    /// [`model_url`](Self::model_url) is provided).
    pub model_path: PathBuf,
    /// Downloaded once when [`model_path`](Self::model_path) is missing.
    pub model_url: Option<String>,
    /// Path to `tokenizer.json`. When absent and [`tokenizer_url`](Self::tokenizer_url) is provided we
    /// infer the filename from the URL and place it next to the model file.
    pub tokenizer_path: Option<PathBuf>,
    pub tokenizer_url: Option<String>,
    /// Token budget per text; longer inputs are truncated.
    pub max_sequence_length: usize,
    /// Normalize the resulting vector to unit-length.
    pub normalize: bool,
    /// Vector width in stub mode.
    pub stub_dim: usize,
    /// Use the stub when ONNX assets are missing and cannot be downloaded.
    pub fallback_to_stub: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::Onnx,
            model_name: "all-MiniLM-L6-v2".into(),
            model_path: PathBuf::from("./models/all-MiniLM-L6-v2/onnx/model.onnx"),
            model_url: None,
            tokenizer_path: Some(PathBuf::from("./models/all-MiniLM-L6-v2/tokenizer.json")),
            tokenizer_url: None,
            max_sequence_length: 256,
            normalize: true,
            stub_dim: 384,
            fallback_to_stub: true,
        }
    }
}

impl SemanticConfig {
    /// Stub-mode config with the given width, for tests and offline runs.
    pub fn stub(stub_dim: usize) -> Self {
        Self {
            mode: EmbeddingMode::Stub,
            stub_dim,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), SemanticError> {
        if self.model_name.trim().is_empty() {
            return Err(SemanticError::InvalidConfig(
                "model_name must not be empty".into(),
            ));
        }
        if self.max_sequence_length == 0 {
            return Err(SemanticError::InvalidConfig(
                "max_sequence_length must be greater than zero".into(),
            ));
        }
        if self.stub_dim == 0 {
            return Err(SemanticError::InvalidConfig(
                "stub_dim must be greater than zero".into(),
            ));
        }
        if self.mode == EmbeddingMode::Onnx
            && self.tokenizer_path.is_none()
            && self.tokenizer_url.is_none()
        {
            return Err(SemanticError::InvalidConfig(
                "onnx mode needs tokenizer_path or tokenizer_url".into(),
            ));
        }
        Ok(())
    }
}
