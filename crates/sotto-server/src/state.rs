//! Shared state injected into request handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use sotto_transcription::Transcriber;

/// State every handler can reach.
///
/// The engine handle is constructed once at startup and never reassigned;
/// `None` means model loading failed and `/transcribe` reports a soft
/// error for the life of the process.
#[derive(Clone)]
pub struct AppState {
    /// The loaded speech-to-text engine, absent when loading failed.
    pub engine: Option<Arc<dyn Transcriber>>,
    /// Whether responses carry the mel-spectrogram data URI.
    pub spectrogram: bool,
    /// Directory receiving per-request temp audio files.
    pub scratch_dir: PathBuf,
    /// When the server started.
    pub start_time: Instant,
}
