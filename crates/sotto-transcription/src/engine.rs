//! whisper.cpp context management and the inference seam.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio;
use crate::types::{TranscriptionError, TranscriptionResult};

/// Threads for whisper.cpp inference.
const INFERENCE_THREADS: i32 = 4;

/// Contract the HTTP layer programs against.
///
/// Input is the decoded waveform — 16 kHz mono f32 in `[-1.0, 1.0]` — so the
/// upload is decoded exactly once per request regardless of what else the
/// handler does with the samples.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Run inference over a decoded waveform and return the transcript.
    async fn transcribe(&self, samples: Vec<f32>) -> Result<TranscriptionResult, TranscriptionError>;
}

/// Speech-to-text engine backed by a pre-trained ggml whisper model.
///
/// The context is loaded once at startup and never mutated; per-request
/// decoding state is created inside each call, so concurrent requests need
/// no locking. Inference always runs on the CPU at full precision
/// (`use_gpu` off) with greedy sampling, which keeps transcripts
/// deterministic for a fixed input.
pub struct WhisperEngine {
    ctx: Arc<WhisperContext>,
    language: Option<String>,
}

impl WhisperEngine {
    /// Load the ggml weights at `model_path`.
    ///
    /// CPU-intensive (reads the full weight file); call once at startup.
    /// `language` is an ISO 639-1 hint; `None` lets the model detect it.
    pub async fn load(
        model_path: PathBuf,
        language: Option<String>,
    ) -> Result<Arc<Self>, TranscriptionError> {
        let ctx = tokio::task::spawn_blocking(move || load_context(&model_path))
            .await
            .map_err(|e| TranscriptionError::ModelNotAvailable(format!("task join: {e}")))??;

        Ok(Arc::new(Self {
            ctx: Arc::new(ctx),
            language,
        }))
    }
}

#[async_trait]
impl Transcriber for WhisperEngine {
    async fn transcribe(&self, samples: Vec<f32>) -> Result<TranscriptionResult, TranscriptionError> {
        #[allow(clippy::cast_precision_loss)]
        let duration_seconds = samples.len() as f64 / f64::from(audio::TARGET_SAMPLE_RATE);

        let ctx = Arc::clone(&self.ctx);
        let language = self.language.clone();
        let text =
            tokio::task::spawn_blocking(move || run_inference(&ctx, language.as_deref(), &samples))
                .await
                .map_err(|e| TranscriptionError::Inference(format!("task join: {e}")))??;

        debug!(duration_secs = duration_seconds, chars = text.len(), "transcription complete");

        Ok(TranscriptionResult {
            text,
            duration_seconds,
        })
    }
}

fn load_context(model_path: &Path) -> Result<WhisperContext, TranscriptionError> {
    if !model_path.exists() {
        return Err(TranscriptionError::ModelNotAvailable(format!(
            "weight file not found: {}",
            model_path.display()
        )));
    }

    info!(path = %model_path.display(), "loading whisper model...");

    let mut params = WhisperContextParameters::default();
    let _ = params.use_gpu(false);

    let ctx = WhisperContext::new_with_params(&model_path.to_string_lossy(), params)
        .map_err(|e| TranscriptionError::ModelNotAvailable(format!("context init: {e}")))?;

    info!("whisper engine ready");
    Ok(ctx)
}

/// Run greedy full-precision inference (CPU-bound, must be on a blocking thread).
fn run_inference(
    ctx: &WhisperContext,
    language: Option<&str>,
    samples: &[f32],
) -> Result<String, TranscriptionError> {
    let mut state = ctx
        .create_state()
        .map_err(|e| TranscriptionError::Inference(format!("state init: {e}")))?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(INFERENCE_THREADS);
    params.set_language(Some(language.unwrap_or("auto")));
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    let _ = state
        .full(params, samples)
        .map_err(|e| TranscriptionError::Inference(format!("full: {e}")))?;

    let n_segments = state
        .full_n_segments()
        .map_err(|e| TranscriptionError::Inference(format!("segment count: {e}")))?;

    let mut text = String::new();
    for i in 0..n_segments {
        let segment = state
            .full_get_segment_text(i)
            .map_err(|e| TranscriptionError::Inference(format!("segment {i}: {e}")))?;
        text.push_str(&segment);
    }

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_fails_without_weight_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = WhisperEngine::load(tmp.path().join("ggml-tiny.bin"), None).await;
        assert!(matches!(
            result,
            Err(TranscriptionError::ModelNotAvailable(_))
        ));
    }

    // Requires downloaded weights — run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn transcribe_silence_yields_text() {
        let dir = crate::model::default_model_dir();
        let path = crate::model::ensure_model(&dir, crate::model::ModelSize::Tiny)
            .await
            .unwrap();
        let engine = WhisperEngine::load(path, Some("en".into())).await.unwrap();
        let samples = vec![0.0f32; 16_000];
        let result = engine.transcribe(samples).await.unwrap();
        assert!((result.duration_seconds - 1.0).abs() < 0.01);
    }
}
