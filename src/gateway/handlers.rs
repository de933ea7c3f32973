use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_title() -> String {
    "Untitled".to_string()
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub title: String,
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({"ok": true}))
}

/// POST /session/create
///
/// Allocates a folder where this session's clips will be stored. The title
/// is echoed back to the client but not persisted anywhere.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, (StatusCode, Json<Value>)> {
    match state.store.create_session().await {
        Ok(session_id) => {
            info!("created session {} ({})", session_id, req.title);
            Ok(Json(CreateSessionResponse {
                session_id,
                title: req.title,
            }))
        }
        Err(e) => {
            error!("failed to create session directory: {}", e);
            Err(internal_error(e))
        }
    }
}

/// POST /upload
///
/// Saves the uploaded file under uploads/<session_id>/<filename>. Unknown
/// session ids are accepted and their directory created on the spot.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut session_id: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("session_id") => {
                session_id = Some(field.text().await.map_err(bad_multipart)?);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let session_id = session_id.ok_or_else(|| missing_field("session_id"))?;
    let (filename, bytes) = file.ok_or_else(|| missing_field("file"))?;

    match state.store.save(&session_id, &filename, &bytes).await {
        Ok((path, size)) => {
            info!(
                "saved {} ({} bytes) for session {}",
                path.display(),
                size,
                session_id
            );
            Ok(Json(json!({
                "ok": true,
                "saved": path.to_string_lossy(),
                "size": size,
            })))
        }
        Err(e) => {
            error!("failed to store upload for session {}: {}", session_id, e);
            Err(internal_error(e))
        }
    }
}

/// POST /stt/transcribe-chunk
///
/// Relays one audio chunk to the STT worker and passes its JSON response
/// straight through. Any upstream failure is converted to an error envelope
/// rather than a raw server error; there is no retry.
pub async fn transcribe_chunk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
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

    match state
        .stt
        .transcribe_chunk(bytes, filename, &session_id, start_ms)
        .await
    {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            warn!("STT worker call failed: {}", e);
            Ok(Json(json!({
                "ok": false,
                "error": format!("whisper upstream: {}", e),
            })))
        }
    }
}

/// POST /debug-upload
///
/// Reports what the server actually received: field names, whether each came
/// in as a file or a plain value, client filenames and the request
/// content-type header. Useful when a client's multipart encoding is off.
pub async fn debug_upload(
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let mut keys = Vec::new();
    let mut types = serde_json::Map::new();
    let mut filenames = serde_json::Map::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(ToString::to_string);

        types.insert(
            name.clone(),
            json!(if filename.is_some() { "file" } else { "text" }),
        );
        filenames.insert(name.clone(), json!(filename));
        keys.push(name);

        // the field must be drained before the next one can be read
        field.bytes().await.map_err(bad_multipart)?;
    }

    Ok(Json(json!({
        "content_type": content_type,
        "keys": keys,
        "types": types,
        "filenames": filenames,
    })))
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
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": err.to_string()})),
    )
}
