//! `SottoServer` — router assembly.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use sotto_transcription::Transcriber;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

/// The sotto HTTP server.
///
/// Owns the configuration and the per-process state; the engine handle is
/// injected once at construction and never replaced (pass `None` when model
/// loading failed — requests then get the soft unavailable error).
pub struct SottoServer {
    config: ServerConfig,
    state: AppState,
}

impl SottoServer {
    /// Create a server around an already-loaded (or absent) engine.
    pub fn new(config: ServerConfig, engine: Option<Arc<dyn Transcriber>>) -> Self {
        let scratch_dir = config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let state = AppState {
            engine,
            spectrogram: config.spectrogram,
            scratch_dir,
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::status::root))
            .route("/health", get(handlers::status::health))
            .route(
                "/transcribe",
                post(handlers::transcribe::transcribe)
                    .layer(DefaultBodyLimit::max(self.config.max_upload_bytes)),
            );

        if let Some(assets) = &self.config.assets_dir {
            router = router.nest_service("/static", ServeDir::new(assets));
        }

        router
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
