//! Model file management — ggml weights fetched from `HuggingFace` by size.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use crate::types::TranscriptionError;

/// `HuggingFace` repository hosting the pre-trained ggml whisper models.
const HF_REPO: &str = "ggerganov/whisper.cpp";

/// Pre-trained model size identifier.
///
/// Selects which single-file ggml weight set the engine loads; larger sizes
/// trade speed for accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSize {
    /// ~75 MB, fastest, the default.
    Tiny,
    /// ~142 MB.
    Base,
    /// ~466 MB.
    Small,
    /// ~1.5 GB.
    Medium,
    /// ~3 GB, most accurate.
    LargeV3,
}

impl ModelSize {
    /// All selectable sizes, smallest first.
    pub const ALL: &[Self] = &[
        Self::Tiny,
        Self::Base,
        Self::Small,
        Self::Medium,
        Self::LargeV3,
    ];

    /// The size identifier as written on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeV3 => "large-v3",
        }
    }

    /// The ggml weight file for this size.
    pub fn file_name(self) -> String {
        format!("ggml-{}.bin", self.as_str())
    }
}

impl Default for ModelSize {
    fn default() -> Self {
        Self::Tiny
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiny" => Ok(Self::Tiny),
            "base" => Ok(Self::Base),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large-v3" | "large" => Ok(Self::LargeV3),
            other => Err(format!(
                "unknown model size '{other}' (expected one of: tiny, base, small, medium, large-v3)"
            )),
        }
    }
}

/// Default model cache directory under `~/.sotto/models/`.
pub fn default_model_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".sotto").join("models")
}

/// Full path of the weight file for `size` under `model_dir`.
pub fn model_path(model_dir: impl AsRef<Path>, size: ModelSize) -> PathBuf {
    model_dir.as_ref().join(size.file_name())
}

/// Check whether the weight file for `size` is already on disk.
pub fn is_model_cached(model_dir: impl AsRef<Path>, size: ModelSize) -> bool {
    model_path(model_dir, size).exists()
}

/// Download the weight file for `size` if not already cached.
///
/// Returns the path to the local weight file. Uses `hf-hub` against the
/// `ggerganov/whisper.cpp` repo; the download runs on a blocking thread
/// since `hf-hub`'s sync API does its own HTTP.
pub async fn ensure_model(
    model_dir: impl AsRef<Path>,
    size: ModelSize,
) -> Result<PathBuf, TranscriptionError> {
    let model_dir = model_dir.as_ref().to_path_buf();
    let target = model_path(&model_dir, size);

    if target.exists() {
        debug!(path = %target.display(), "model weights already cached");
        return Ok(target);
    }

    info!(model = %size, "downloading whisper weights from HuggingFace...");
    std::fs::create_dir_all(&model_dir).map_err(TranscriptionError::Io)?;

    let path = target.clone();
    tokio::task::spawn_blocking(move || download_weights(&path, size))
        .await
        .map_err(|e| TranscriptionError::ModelNotAvailable(format!("task join: {e}")))??;

    Ok(target)
}

fn download_weights(target: &Path, size: ModelSize) -> Result<(), TranscriptionError> {
    let api = hf_hub::api::sync::Api::new()
        .map_err(|e| TranscriptionError::ModelNotAvailable(format!("HF API init: {e}")))?;
    let repo = api.model(HF_REPO.to_string());
    let file_name = size.file_name();

    let cached = repo.get(&file_name).map_err(|e| {
        TranscriptionError::ModelNotAvailable(format!("download failed for {file_name}: {e}"))
    })?;

    // hf-hub caches under its own directory; keep a stable copy next to ours.
    if cached != target {
        let _ = std::fs::copy(&cached, target).map_err(|e| {
            TranscriptionError::ModelNotAvailable(format!("failed to copy {file_name}: {e}"))
        })?;
    }

    info!(path = %target.display(), "model weights ready");
    Ok(())
}
