use crate::SemanticError;

/// Turns text into fixed-width vectors.
///
/// Implementations are loaded once per process and shared behind an
/// `Arc<dyn Embedder>`. Encoding must be deterministic: the same text yields
/// the same vector on every call.
pub trait Embedder: Send + Sync {
    /// Label used in logs and health output.
    fn model_name(&self) -> &str;

    /// Vector width, when known before the first call.
    fn dimension(&self) -> Option<usize>;

    /// True for the hashed bag-of-words stand-in rather than a real model.
    fn is_stub(&self) -> bool {
        false
    }

    /// Encodes each text, preserving order. An empty batch yields an empty result.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError>;

    fn encode(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        self.encode_batch(&[text])?
            .pop()
            .ok_or_else(|| SemanticError::Inference("embedder returned no vectors".into()))
    }
}
