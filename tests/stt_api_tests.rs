// Integration tests for the STT worker HTTP surface.
//
// A stub model stands in for whisper so the handler pipeline (multipart →
// scratch file → decode → voice activity gate → response shape) can be
// exercised without model weights.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use voxbridge::config::WorkerConfig;
use voxbridge::stt::{create_router, AppState, ModelOutput, Segment, SpeechModel, SttError};

const BOUNDARY: &str = "x-test-boundary-1a2b3c";

/// Fixed-output model; counts invocations so tests can assert whether the
/// voice activity gate let a chunk through.
struct StubModel {
    output: ModelOutput,
    calls: AtomicUsize,
}

impl StubModel {
    fn new(output: ModelOutput) -> Arc<Self> {
        Arc::new(Self {
            output,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SpeechModel for StubModel {
    async fn transcribe(&self, _samples: Vec<f32>) -> Result<ModelOutput, SttError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

fn worker_config() -> WorkerConfig {
    WorkerConfig {
        port: 0,
        model_path: "models/ggml-base.bin".to_string(),
        device: "cpu".to_string(),
        compute: "int8".to_string(),
    }
}

fn stub_output() -> ModelOutput {
    ModelOutput {
        segments: vec![Segment {
            start: 0.0,
            end: 1.4,
            text: "hello there".to_string(),
        }],
        language: Some("Hebrew".to_string()),
    }
}

/// 16 kHz mono 16-bit WAV bytes.
fn wav_bytes(samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn silent_clip_3s() -> Vec<u8> {
    wav_bytes(&vec![0i16; 16_000 * 3])
}

fn voiced_clip_1s() -> Vec<u8> {
    let samples: Vec<i16> = (0..16_000)
        .map(|i| ((i as f32 * 0.17).sin() * 12_000.0) as i16)
        .collect();
    wav_bytes(&samples)
}

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn transcribe_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/transcribe-chunk")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_model_configuration() {
    let stub = StubModel::new(ModelOutput::default());
    let app = create_router(AppState::new(stub, worker_config()));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["model"], "models/ggml-base.bin");
    assert_eq!(body["device"], "cpu");
    assert_eq!(body["compute"], "int8");
}

#[tokio::test]
async fn silent_chunk_skips_inference_and_reports_no_speech() {
    // the stub would return a transcript, so an empty response proves the
    // gate never invoked it
    let stub = StubModel::new(stub_output());
    let app = create_router(AppState::new(stub.clone(), worker_config()));

    let clip = silent_clip_3s();
    let body = multipart_body(&[
        ("session_id", None, b"abc12345"),
        ("start_ms", None, b"9000"),
        ("file", Some("quiet.wav"), &clip),
    ]);
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["session_id"], "abc12345");
    assert_eq!(body["start_ms"], 9000);
    assert_eq!(body["lang"], "auto");
    assert_eq!(body["segments"].as_array().unwrap().len(), 0);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn voiced_chunk_reaches_the_model_and_lang_is_normalized() {
    let stub = StubModel::new(stub_output());
    let app = create_router(AppState::new(stub.clone(), worker_config()));

    let clip = voiced_clip_1s();
    let body = multipart_body(&[
        ("session_id", None, b"abc12345"),
        ("start_ms", None, b"4000"),
        ("file", Some("clip1.wav"), &clip),
    ]);
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["lang"], "he");
    assert_eq!(body["start_ms"], 4000);

    let segments = body["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0]["text"], "hello there");
    assert_eq!(segments[0]["start"], 0.0);
    assert_eq!(segments[0]["end"], 1.4);

    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn metadata_fields_default_when_absent() {
    let stub = StubModel::new(stub_output());
    let app = create_router(AppState::new(stub, worker_config()));

    let clip = voiced_clip_1s();
    let body = multipart_body(&[("file", Some("clip1.wav"), &clip)]);
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["session_id"], "");
    assert_eq!(body["start_ms"], 0);
}

#[tokio::test]
async fn chunk_without_file_field_is_rejected() {
    let stub = StubModel::new(ModelOutput::default());
    let app = create_router(AppState::new(stub, worker_config()));

    let body = multipart_body(&[("session_id", None, b"abc12345")]);
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"].is_string());
}

#[tokio::test]
async fn undecodable_chunk_is_a_server_error() {
    let stub = StubModel::new(ModelOutput::default());
    let app = create_router(AppState::new(stub.clone(), worker_config()));

    let body = multipart_body(&[
        ("session_id", None, b"abc12345"),
        ("file", Some("chunk.wav"), b"definitely not audio"),
    ]);
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(read_json(response).await["error"].is_string());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}
