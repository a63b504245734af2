//! NLQ embedding provider.
//!
//! Turns text into vectors the matcher can compare. Two backends sit behind
//! the [`Embedder`] trait:
//!
//! - **ONNX mode** runs a sentence-transformer (all-MiniLM-L6-v2 by default)
//!   locally. Token vectors are mean-pooled over the attention mask and,
//!   optionally, L2-normalized.
//! - **Stub mode** hashes words into buckets. No model files, fully
//!   deterministic, good enough for tests and for limping along offline.
//!
//! Loading is the expensive part, so it happens once through
//! [`load_embedder`] and the result is shared as `Arc<dyn Embedder>`. When the
//! model or tokenizer is missing and cannot be downloaded, the loader falls
//! back to the stub if `fallback_to_stub` is set.
//!
//! ```no_run
//! use semantic::{load_embedder, SemanticConfig};
//!
//! # async fn run() -> Result<(), semantic::SemanticError> {
//! let embedder = load_embedder(&SemanticConfig::default()).await?;
//! let vector = embedder.encode("show all pending orders")?;
//! # Ok(())
//! # }
//! ```

mod assets;
mod config;
mod embedder;
mod error;
mod normalize;
mod onnx;
mod stub;

use std::sync::Arc;

use tracing::{error, info};

pub use crate::assets::{resolve_model_assets, ModelAssets};
pub use crate::config::{EmbeddingMode, SemanticConfig};
pub use crate::embedder::Embedder;
pub use crate::error::SemanticError;
pub use crate::normalize::l2_normalize_in_place;
pub use crate::onnx::OnnxEmbedder;
pub use crate::stub::StubEmbedder;

/// Builds the process-wide embedder described by `cfg`.
///
/// ONNX assets are resolved (and downloaded when URLs are configured) before
/// the session is opened on a blocking thread.
pub async fn load_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn Embedder>, SemanticError> {
    cfg.validate()?;

    match cfg.mode {
        EmbeddingMode::Stub => {
            info!(dim = cfg.stub_dim, "using stub embedder");
            Ok(Arc::new(StubEmbedder::from_config(cfg)))
        }
        EmbeddingMode::Onnx => {
            let assets = match resolve_model_assets(cfg).await {
                Ok(assets) => assets,
                Err(err) if cfg.fallback_to_stub && err.is_missing_assets() => {
                    error!(
                        error = %err,
                        dim = cfg.stub_dim,
                        "onnx assets unavailable, falling back to stub embedder; match quality is degraded"
                    );
                    return Ok(Arc::new(StubEmbedder::from_config(cfg)));
                }
                Err(err) => return Err(err),
            };

            let owned = cfg.clone();
            let embedder = tokio::task::spawn_blocking(move || OnnxEmbedder::load(&assets, &owned))
                .await
                .map_err(|e| SemanticError::Inference(e.to_string()))??;
            info!(model = %cfg.model_name, "embedding model loaded");
            Ok(Arc::new(embedder))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn stub_mode_loads_without_assets() {
        let embedder = load_embedder(&SemanticConfig::stub(64)).await.unwrap();
        assert_eq!(embedder.dimension(), Some(64));
        assert_eq!(embedder.encode("hello").unwrap().len(), 64);
    }

    #[tokio::test]
    async fn missing_assets_fall_back_to_stub() {
        let cfg = SemanticConfig {
            model_path: PathBuf::from("./no/such/model.onnx"),
            stub_dim: 32,
            ..Default::default()
        };
        let embedder = load_embedder(&cfg).await.unwrap();
        assert_eq!(embedder.model_name(), "stub-32");
        assert!(embedder.is_stub());
    }

    #[tokio::test]
    async fn missing_assets_error_without_fallback() {
        let cfg = SemanticConfig {
            model_path: PathBuf::from("./no/such/model.onnx"),
            fallback_to_stub: false,
            ..Default::default()
        };
        let err = load_embedder(&cfg).await.err().unwrap();
        assert!(matches!(err, SemanticError::ModelNotFound(_)));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_loading() {
        let cfg = SemanticConfig::stub(0);
        assert!(matches!(
            load_embedder(&cfg).await,
            Err(SemanticError::InvalidConfig(_))
        ));
    }
}
