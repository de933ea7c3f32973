use std::path::Path;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::audio;
use super::engine::{normalize_lang, ModelOutput, Segment};
use super::state::AppState;
use super::vad;

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub ok: bool,
    pub session_id: String,
    pub lang: String,
    pub start_ms: i64,
    pub segments: Vec<Segment>,
}

/// GET /health
///
/// Reports readiness plus the model configuration the process started with.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "model": state.config.model_path,
        "device": state.config.device,
        "compute": state.config.compute,
    }))
}

/// POST /transcribe-chunk
///
/// Writes the uploaded chunk to a scratch file, decodes it, gates it through
/// the voice activity check and runs inference. `session_id` and `start_ms`
/// are advisory metadata echoed back untouched.
pub async fn transcribe_chunk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, (StatusCode, Json<Value>)> {
    let mut session_id = String::new();
    let mut start_ms: i64 = 0;
    let mut file: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("session_id") => {
                session_id = field.text().await.map_err(bad_multipart)?;
            }
            Some("start_ms") => {
                let raw = field.text().await.map_err(bad_multipart)?;
                start_ms = raw.trim().parse().unwrap_or(0);
            }
            Some("file") => {
                let filename = field.file_name().map(ToString::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| missing_field("file"))?;

    // Scratch file scoped to this request. The suffix is taken from the
    // client filename so the decoder's format hint survives the round trip;
    // drop removes the file on every exit path, best effort.
    let suffix = filename.as_deref().map(extension_suffix).unwrap_or_else(|| ".m4a".to_string());
    let scratch = tempfile::Builder::new()
        .prefix("chunk-")
        .suffix(&suffix)
        .tempfile()
        .map_err(internal_error)?;
    std::fs::write(scratch.path(), &bytes).map_err(internal_error)?;

    let samples = audio::decode_to_model_input(scratch.path()).map_err(internal_error)?;

    let output = if vad::has_speech(&samples, audio::TARGET_SAMPLE_RATE) {
        state
            .model
            .transcribe(samples)
            .await
            .map_err(internal_error)?
    } else {
        info!("chunk for session {:?} carries no speech, skipping inference", session_id);
        ModelOutput::default()
    };

    Ok(Json(TranscribeResponse {
        ok: true,
        session_id,
        lang: normalize_lang(output.language.as_deref()),
        start_ms,
        segments: output.segments,
    }))
}

/// ".ext" of the client-supplied filename, defaulting to ".m4a" when the
/// name has no extension.
fn extension_suffix(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| ".m4a".to_string())
}

fn bad_multipart(err: MultipartError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": format!("malformed multipart request: {}", err)})),
    )
}

fn missing_field(name: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": format!("missing multipart field '{}'", name)})),
    )
}

fn internal_error(err: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    error!("transcription failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": err.to_string()})),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_follows_the_client_extension() {
        assert_eq!(extension_suffix("clip1.m4a"), ".m4a");
        assert_eq!(extension_suffix("note.wav"), ".wav");
        assert_eq!(extension_suffix("archive.tar.gz"), ".gz");
    }

    #[test]
    fn suffix_defaults_when_extension_is_missing() {
        assert_eq!(extension_suffix("chunk"), ".m4a");
        assert_eq!(extension_suffix(""), ".m4a");
    }
}
