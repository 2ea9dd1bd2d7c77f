//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP layer.
///
/// Model selection lives with the engine (`sotto-transcription`); this
/// struct only covers what the server itself needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `8000`).
    pub port: u16,
    /// Whether `/transcribe` responses include the mel-spectrogram data URI.
    pub spectrogram: bool,
    /// Directory for per-request temp audio files (`None` → the system
    /// temp dir).
    pub scratch_dir: Option<PathBuf>,
    /// Front-end asset directory served under `/static` (`None` → no mount).
    pub assets_dir: Option<PathBuf>,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            spectrogram: true,
            scratch_dir: None,
            assets_dir: None,
            max_upload_bytes: 50 * 1024 * 1024, // 50 MB
        }
    }
}
