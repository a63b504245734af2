use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticConfig, SemanticError};

/// Deterministic embedder used in stub mode or when model assets are unavailable.
///
/// Each alphanumeric word is lowercased, hashed into one of `dim` buckets and
/// added with a hash-derived sign. Texts sharing words therefore score higher
/// than unrelated texts, which keeps the matcher usable without a model.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dim: usize,
    normalize: bool,
    model_name: String,
}

impl StubEmbedder {
    pub fn new(dim: usize, normalize: bool) -> Self {
        Self {
            dim: dim.max(1),
            normalize,
            model_name: format!("stub-{}", dim.max(1)),
        }
    }

    pub fn from_config(cfg: &SemanticConfig) -> Self {
        Self::new(cfg.stub_dim, cfg.normalize)
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            let h = hash64(word.to_lowercase().as_bytes());
            let bucket = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
            v[bucket] += sign;
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

impl Embedder for StubEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim)
    }

    fn is_stub(&self) -> bool {
        true
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}
