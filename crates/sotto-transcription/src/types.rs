//! Core types shared across the transcription pipeline.

/// Result of transcribing one audio upload.
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    /// The recognized text.
    pub text: String,
    /// Duration of the decoded audio in seconds.
    pub duration_seconds: f64,
}

/// Errors that can occur between receiving audio bytes and producing text.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// Model file missing, download failed, or context creation failed.
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// whisper.cpp inference failure.
    #[error("inference error: {0}")]
    Inference(String),

    /// Audio decoding failure (unsupported container, corrupt data).
    #[error("audio decode error: {0}")]
    AudioDecode(String),

    /// Resampling failure.
    #[error("resample error: {0}")]
    Resample(String),

    /// I/O failure (model file read, cache dir creation).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_fields() {
        let r = TranscriptionResult {
            text: "the quick brown fox".into(),
            duration_seconds: 1.25,
        };
        assert_eq!(r.text, "the quick brown fox");
        assert_eq!(r.duration_seconds, 1.25);
    }

    #[test]
    fn error_display_includes_source_text() {
        let e = TranscriptionError::ModelNotAvailable("ggml-tiny.bin missing".into());
        assert!(e.to_string().contains("ggml-tiny.bin missing"));

        let e = TranscriptionError::AudioDecode("no audio track".into());
        assert!(e.to_string().contains("no audio track"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = TranscriptionError::from(io);
        assert!(matches!(e, TranscriptionError::Io(_)));
        assert!(e.to_string().contains("gone"));
    }
}
