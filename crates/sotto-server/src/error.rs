//! Error-to-response translation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use sotto_spectrogram::SpectrogramError;
use sotto_transcription::TranscriptionError;

/// Wire shape for every failure: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Human-readable description including the captured source error.
    pub error: String,
}

impl ErrorBody {
    /// Build the body from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// A processing failure inside `/transcribe`.
///
/// Every variant collapses to the same observable shape: HTTP 500 with the
/// source error text embedded. Model unavailability is deliberately not
/// represented here — that case answers 200 with an error body (see the
/// transcribe handler).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing upload field.
    #[error("invalid upload: {0}")]
    Upload(String),

    /// Decode, resample, or inference failure.
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    /// Spectrogram computation or encoding failure.
    #[error(transparent)]
    Spectrogram(#[from] SpectrogramError),

    /// Temp-file creation, write, or read-back failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Runtime plumbing failure (blocking-task join).
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(format!("An error occurred during transcription: {self}"));
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_map_to_500() {
        let resp = ApiError::Upload("no file field".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn body_carries_source_text() {
        let err = ApiError::Transcription(TranscriptionError::AudioDecode("bad header".into()));
        let resp = err.into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let message = parsed["error"].as_str().unwrap();
        assert!(message.contains("bad header"));
        assert!(message.starts_with("An error occurred during transcription"));
    }

    #[test]
    fn error_body_serializes_single_key() {
        let body = ErrorBody::new("boom");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }
}
