use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{SemanticConfig, SemanticError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAssets {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

/// Ensures that the model and tokenizer exist locally, downloading them when URLs are provided.
pub async fn resolve_model_assets(cfg: &SemanticConfig) -> Result<ModelAssets, SemanticError> {
    let model_path = ensure_local_file(&cfg.model_path, cfg.model_url.as_deref(), || {
        SemanticError::ModelNotFound(cfg.model_path.display().to_string())
    })
    .await?;

    let tokenizer_target = tokenizer_storage_path(cfg)?;
    let tokenizer_path = ensure_local_file(&tokenizer_target, cfg.tokenizer_url.as_deref(), || {
        SemanticError::TokenizerMissing(tokenizer_target.display().to_string())
    })
    .await?;

    Ok(ModelAssets {
        model_path,
        tokenizer_path,
    })
}

/// Where the tokenizer lives. Without an explicit path the filename comes from
/// the URL and the file sits next to the model.
fn tokenizer_storage_path(cfg: &SemanticConfig) -> Result<PathBuf, SemanticError> {
    if let Some(path) = &cfg.tokenizer_path {
        return Ok(path.clone());
    }

    if let Some(url) = &cfg.tokenizer_url {
        let inferred_name = infer_filename_from_url(url).unwrap_or_else(|| "tokenizer.json".into());
        let base_dir = cfg
            .model_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok(base_dir.join(inferred_name));
    }

    Err(SemanticError::TokenizerMissing(cfg.model_name.clone()))
}

async fn ensure_local_file<F>(
    target: &Path,
    remote_url: Option<&str>,
    on_missing: F,
) -> Result<PathBuf, SemanticError>
where
    F: FnOnce() -> SemanticError,
{
    if target.exists() {
        return Ok(target.to_path_buf());
    }

    if let Some(url) = remote_url {
        download_to_path(target, url).await?;
        return Ok(target.to_path_buf());
    }

    Err(on_missing())
}

async fn download_to_path(target: &Path, url: &str) -> Result<(), SemanticError> {
    if let Some(parent) = target.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    info!(%url, target = %target.display(), "downloading model asset");
    let response = reqwest::get(url)
        .await
        .map_err(|e| SemanticError::Download(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SemanticError::Download(format!(
            "unexpected status {status} while fetching {url}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| SemanticError::Download(e.to_string()))?;

    fs::write(target, &bytes)?;
    Ok(())
}

/// Last path segment of `url`, without query or fragment.
fn infer_filename_from_url(url: &str) -> Option<String> {
    url.split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .and_then(|segment| segment.split(['?', '#']).next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_from_url() {
        assert_eq!(
            infer_filename_from_url("https://hf.co/m/resolve/main/tokenizer.json?download=1"),
            Some("tokenizer.json".into())
        );
        assert_eq!(infer_filename_from_url("https://hf.co/vocab.json/"), Some("vocab.json".into()));
        assert_eq!(infer_filename_from_url(""), None);
    }

    #[test]
    fn tokenizer_path_defaults_next_to_model() {
        let cfg = SemanticConfig {
            model_path: PathBuf::from("/srv/models/minilm/model.onnx"),
            tokenizer_path: None,
            tokenizer_url: Some("https://example.com/files/tok.json".into()),
            ..Default::default()
        };
        assert_eq!(
            tokenizer_storage_path(&cfg).unwrap(),
            PathBuf::from("/srv/models/minilm/tok.json")
        );
    }

    #[tokio::test]
    async fn missing_model_without_url_is_reported() {
        let cfg = SemanticConfig {
            model_path: PathBuf::from("./definitely/not/here/model.onnx"),
            ..Default::default()
        };
        let err = resolve_model_assets(&cfg).await.unwrap_err();
        assert!(matches!(err, SemanticError::ModelNotFound(_)));
        assert!(err.is_missing_assets());
    }
}
