//! End-to-end tests driving the server over a real socket.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;

use sotto_server::{ServerConfig, SottoServer};
use sotto_transcription::{Transcriber, TranscriptionError, TranscriptionResult};

/// Engine double returning a fixed transcript.
struct StubEngine;

#[async_trait]
impl Transcriber for StubEngine {
    async fn transcribe(
        &self,
        samples: Vec<f32>,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        #[allow(clippy::cast_precision_loss)]
        let duration_seconds = samples.len() as f64 / 16_000.0;
        Ok(TranscriptionResult {
            text: "the stale smell of old beer lingers".into(),
            duration_seconds,
        })
    }
}

/// Boot a server on an ephemeral port and return its base URL.
async fn boot(config: ServerConfig, engine: Option<Arc<dyn Transcriber>>) -> String {
    let app = SottoServer::new(config, engine).router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _ = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Minimal 16 kHz mono PCM WAV carrying a quiet sine tone.
fn test_wav(seconds: f64) -> Vec<u8> {
    let num_samples = (seconds * 16_000.0) as u32;
    let data_size = num_samples * 2;
    let mut buf = Vec::with_capacity(44 + data_size as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVEfmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&16_000u32.to_le_bytes());
    buf.extend_from_slice(&32_000u32.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for i in 0..num_samples {
        let v = ((i as f32 / 30.0).sin() * 8_000.0) as i16;
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

fn wav_form(file_name: &str, bytes: Vec<u8>) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
    )
}

#[tokio::test]
async fn readiness_route_over_the_wire() {
    let base = boot(ServerConfig::default(), Some(Arc::new(StubEngine))).await;
    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "sotto is ready to transcribe audio");
}

#[tokio::test]
async fn upload_round_trip_with_spectrogram() {
    let base = boot(ServerConfig::default(), Some(Arc::new(StubEngine))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/transcribe"))
        .multipart(wav_form("harvard.wav", test_wav(1.0)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["transcription"], "the stale smell of old beer lingers");

    // The data URI must decode back to a real PNG stream.
    let uri = body["mel_spectrogram"].as_str().unwrap();
    let b64 = uri.strip_prefix("data:image/png;base64,").unwrap();
    let png = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn unavailable_model_is_soft_error_over_the_wire() {
    let base = boot(ServerConfig::default(), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/transcribe"))
        .multipart(wav_form("speech.wav", test_wav(0.5)))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().is_some());
    assert!(body.get("transcription").is_none());
}

#[tokio::test]
async fn corrupt_upload_is_500_and_scratch_dir_stays_clean() {
    let scratch = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        scratch_dir: Some(scratch.path().to_path_buf()),
        ..ServerConfig::default()
    };
    let base = boot(config, Some(Arc::new(StubEngine))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/transcribe"))
        .multipart(wav_form("junk.wav", b"not a riff stream".to_vec()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("An error occurred during transcription"));

    let leftovers: Vec<_> = std::fs::read_dir(scratch.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "temp artifact outlived its request");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let base = boot(config, Some(Arc::new(StubEngine))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/transcribe"))
        .multipart(wav_form("big.wav", test_wav(5.0)))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_client_error() || resp.status().is_server_error());
}
