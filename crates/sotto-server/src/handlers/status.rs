//! `GET /` readiness and `GET /health`.

use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::state::AppState;

/// Readiness body for `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyResponse {
    /// Static readiness message.
    pub message: String,
}

/// Health body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Seconds since startup.
    pub uptime_secs: u64,
    /// Whether the transcription model loaded at startup.
    pub model_loaded: bool,
}

/// Build a health response from live state.
pub fn health_check(start_time: Instant, model_loaded: bool) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        model_loaded,
    }
}

/// `GET /` — always 200, whether or not the model loaded.
pub async fn root() -> Json<ReadyResponse> {
    Json(ReadyResponse {
        message: "sotto is ready to transcribe audio".into(),
    })
}

/// `GET /health`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_check(state.start_time, state.engine.is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_ok() {
        let resp = health_check(Instant::now(), true);
        assert_eq!(resp.status, "ok");
        assert!(resp.model_loaded);
    }

    #[test]
    fn uptime_counts_up() {
        let start = Instant::now()
            .checked_sub(std::time::Duration::from_secs(120))
            .unwrap();
        let resp = health_check(start, false);
        assert!(resp.uptime_secs >= 119);
        assert!(!resp.model_loaded);
    }

    #[test]
    fn ready_serialization() {
        let body = ReadyResponse {
            message: "sotto is ready to transcribe audio".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "sotto is ready to transcribe audio");
    }

    #[test]
    fn health_serialization() {
        let resp = health_check(Instant::now(), true);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model_loaded"], true);
        assert!(json["uptime_secs"].is_number());
    }
}
