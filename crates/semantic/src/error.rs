use std::io;
use thiserror::Error;

/// Errors surfaced while loading or running an embedder.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// The ONNX model could not be located locally and no fallback URL was provided.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing and there was no remote URL to fetch it from.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    #[error("download failed: {0}")]
    Download(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// ONNX Runtime, tokenizer, or pooling errors.
    #[error("inference failure: {0}")]
    Inference(String),
    /// The inference worker thread is gone.
    #[error("embedding worker unavailable")]
    WorkerUnavailable,
}

impl SemanticError {
    /// Asset problems that the stub embedder can paper over.
    pub fn is_missing_assets(&self) -> bool {
        matches!(
            self,
            SemanticError::ModelNotFound(_)
                | SemanticError::TokenizerMissing(_)
                | SemanticError::Download(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = SemanticError::ModelNotFound("/path/to/model.onnx".into());
        assert_eq!(err.to_string(), "model file not found: /path/to/model.onnx");

        let err = SemanticError::Inference("ONNX session failed".into());
        assert!(err.to_string().contains("inference failure"));
    }

    #[test]
    fn error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SemanticError = io_err.into();
        assert!(err.to_string().contains("io error"));
        assert!(!err.is_missing_assets());
    }

    #[test]
    fn missing_asset_classification() {
        assert!(SemanticError::ModelNotFound("m".into()).is_missing_assets());
        assert!(SemanticError::TokenizerMissing("t".into()).is_missing_assets());
        assert!(SemanticError::Download("d".into()).is_missing_assets());
        assert!(!SemanticError::Inference("i".into()).is_missing_assets());
        assert!(!SemanticError::WorkerUnavailable.is_missing_assets());
    }
}
