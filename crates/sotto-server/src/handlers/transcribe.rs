//! `POST /transcribe` — the core upload → transcript pipeline.

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use sotto_transcription::{audio, Transcriber};

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

/// Success body: the transcript, plus the rendered spectrogram when enabled.
#[derive(Debug, Clone, Serialize)]
pub struct TranscribeResponse {
    /// Recognized text.
    pub transcription: String,
    /// `data:image/png;base64,...` heatmap of the upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mel_spectrogram: Option<String>,
}

/// One uploaded file: its bytes and the name the client declared.
struct Upload {
    bytes: Vec<u8>,
    file_name: String,
}

/// `POST /transcribe`.
///
/// Model unavailable answers 200 with an error body — an oddity of the
/// original API contract that clients already depend on. Every processing
/// failure is a 500 with the same body shape.
#[instrument(skip_all)]
pub async fn transcribe(State(state): State<AppState>, multipart: Multipart) -> Response {
    let Some(engine) = state.engine.clone() else {
        info!("transcription requested but no model is loaded");
        return Json(ErrorBody::new("transcription model is not available")).into_response();
    };

    match process_upload(&state, engine, multipart).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            warn!(error = %e, "transcription request failed");
            e.into_response()
        }
    }
}

/// The linear pipeline: temp file → decode → (spectrogram) → transcribe.
///
/// The temp artifact lives exactly as long as this function — `NamedTempFile`
/// unlinks on drop, so the cleanup invariant holds on every exit path,
/// including each `?`.
async fn process_upload(
    state: &AppState,
    engine: Arc<dyn Transcriber>,
    mut multipart: Multipart,
) -> Result<TranscribeResponse, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let extension = file_extension(&upload.file_name);

    let mut temp = tempfile::Builder::new()
        .prefix("sotto-upload-")
        .suffix(&extension.as_deref().map(|e| format!(".{e}")).unwrap_or_default())
        .tempfile_in(&state.scratch_dir)?;

    // The full upload must be on disk before any processing starts.
    temp.write_all(&upload.bytes)?;
    temp.flush()?;
    debug!(
        path = %temp.path().display(),
        bytes = upload.bytes.len(),
        "upload persisted to temp file"
    );

    let stored = std::fs::read(temp.path())?;

    // Decode once; the same waveform feeds the spectrogram and the engine.
    let want_spectrogram = state.spectrogram;
    let ext = extension.clone();
    let (samples, mel_spectrogram) = tokio::task::spawn_blocking(move || {
        let samples = audio::decode_audio(&stored, ext.as_deref())?;
        let mel = if want_spectrogram {
            Some(sotto_spectrogram::spectrogram_data_uri(
                &samples,
                audio::TARGET_SAMPLE_RATE,
            )?)
        } else {
            None
        };
        Ok::<_, ApiError>((samples, mel))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join: {e}")))??;

    let result = engine.transcribe(samples).await?;
    info!(
        file = %upload.file_name,
        duration_secs = result.duration_seconds,
        "upload transcribed"
    );

    Ok(TranscribeResponse {
        transcription: result.text,
        mel_spectrogram,
    })
}

/// Pull the uploaded file out of the multipart stream.
///
/// Prefers the `file` field (the documented contract) but accepts any field
/// carrying a filename, and reads it to completion before returning.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(format!("multipart read: {e}")))?
    {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(format!("upload read: {e}")))?;

        return Ok(Upload {
            bytes: bytes.to_vec(),
            file_name,
        });
    }

    Err(ApiError::Upload("no file field in request".into()))
}

/// Extension of the declared filename, lowercased, without the dot.
fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
}
