//! # sotto-spectrogram
//!
//! Turns a decoded 16 kHz mono waveform into an inline-viewable image:
//!
//! ```text
//! f32 samples → STFT + mel filterbank (mel_spec) → dB relative to peak
//! → grayscale PNG heatmap → data:image/png;base64,... URI
//! ```
//!
//! Spectral math is delegated to the `mel_spec` crate; this crate only
//! scales, renders, and encodes.

#![deny(unsafe_code)]

pub mod mel;
pub mod render;

pub use mel::{mel_frames, scale_db};
pub use render::{data_uri, render_png, spectrogram_data_uri};

/// Errors between a decoded waveform and the final data URI.
#[derive(Debug, thiserror::Error)]
pub enum SpectrogramError {
    /// Not enough samples for a single analysis frame.
    #[error("signal too short for a spectrogram ({0} samples)")]
    EmptySignal(usize),

    /// PNG encoding failure.
    #[error("png encode error: {0}")]
    Encode(String),
}
