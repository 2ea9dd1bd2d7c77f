//! # sotto-transcription
//!
//! Audio decoding and speech-to-text for the sotto service.
//!
//! ```text
//! upload bytes → symphonia decode → rubato resample to 16 kHz mono f32
//! → whisper.cpp (ggml model, greedy decoding, CPU) → transcript text
//! ```
//!
//! The HTTP layer depends on the [`Transcriber`] trait rather than the
//! concrete [`WhisperEngine`], which keeps request handling decoupled from
//! inference code.

#![deny(unsafe_code)]

pub mod audio;
pub mod engine;
pub mod model;
pub mod types;

pub use engine::{Transcriber, WhisperEngine};
pub use model::ModelSize;
pub use types::{TranscriptionError, TranscriptionResult};
