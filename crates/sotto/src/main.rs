//! # sotto
//!
//! Service binary — fetches/loads the whisper model once, then serves the
//! HTTP endpoints until interrupted. A model that fails to load is not
//! fatal: the server runs and `/transcribe` reports the soft unavailable
//! error, matching the service's published contract.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use sotto_server::{ServerConfig, SottoServer};
use sotto_transcription::{model, ModelSize, Transcriber, WhisperEngine};

/// Speech-to-text HTTP service.
#[derive(Parser, Debug)]
#[command(name = "sotto", about = "Speech-to-text HTTP service")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Model size to load: tiny, base, small, medium, large-v3.
    #[arg(long, default_value = "tiny")]
    model: ModelSize,

    /// Directory holding model weight files (default `~/.sotto/models`).
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Language hint (ISO 639-1 code); omit for auto-detection.
    #[arg(long)]
    language: Option<String>,

    /// Leave the mel spectrogram out of responses.
    #[arg(long)]
    no_spectrogram: bool,

    /// Front-end asset directory served under `/static`.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Directory for per-request temp audio files (default: system temp dir).
    #[arg(long)]
    scratch_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let engine = load_engine(&cli).await;

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        spectrogram: !cli.no_spectrogram,
        scratch_dir: cli.scratch_dir,
        assets_dir: cli.assets_dir,
        ..ServerConfig::default()
    };

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "sotto listening");

    let server = SottoServer::new(config, engine);
    axum::serve(listener, server.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Fetch weights if needed and load the engine.
///
/// Any failure leaves the handle absent instead of aborting startup.
async fn load_engine(cli: &Cli) -> Option<Arc<dyn Transcriber>> {
    let model_dir = cli
        .model_dir
        .clone()
        .unwrap_or_else(model::default_model_dir);

    let weights = match model::ensure_model(&model_dir, cli.model).await {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, "could not fetch model weights; serving without a model");
            return None;
        }
    };

    match WhisperEngine::load(weights, cli.language.clone()).await {
        Ok(engine) => {
            info!(model = %cli.model, "whisper model loaded");
            Some(engine as Arc<dyn Transcriber>)
        }
        Err(e) => {
            error!(error = %e, "failed to load whisper model");
            None
        }
    }
}

/// Resolves when the process receives an interrupt.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
