//! Client-facing gateway service.
//!
//! Exposes session creation, file upload, the chunk-transcription relay and
//! health/debug endpoints:
//! - GET /health - liveness check
//! - POST /session/create - allocate a session folder for uploaded clips
//! - POST /upload - store a file under uploads/<session_id>/<filename>
//! - POST /stt/transcribe-chunk - relay one audio chunk to the STT worker
//! - POST /debug-upload - introspect what a multipart request contained

mod handlers;
mod routes;
mod state;
pub mod store;
pub mod stt_client;

pub use routes::create_router;
pub use state::AppState;
pub use store::UploadStore;
pub use stt_client::SttClient;
