//! # sotto-server
//!
//! Axum HTTP layer for the sotto transcription service.
//!
//! - `GET /` — readiness message
//! - `GET /health` — uptime and model status
//! - `POST /transcribe` — multipart audio upload → transcript JSON,
//!   optionally with an inline mel-spectrogram data URI
//! - `/static` — front-end assets, when configured
//!
//! Each request is one linear pass: persist the upload to a scoped temp
//! file, decode, optionally render, transcribe, respond. The temp artifact
//! is removed on every exit path.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use server::SottoServer;
pub use state::AppState;
