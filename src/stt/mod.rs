//! STT worker service.
//!
//! Wraps a locally-loaded whisper.cpp model behind a small HTTP surface:
//! - GET /health - readiness plus the model configuration fixed at startup
//! - POST /transcribe-chunk - transcribe one uploaded audio chunk
//!
//! Each request is a linear pass: scratch-write the upload, decode it to
//! 16 kHz mono, gate it through an energy-based voice activity check, run
//! inference, respond. The scratch file is removed on every exit path.

pub mod audio;
pub mod engine;
mod handlers;
mod routes;
mod state;
pub mod vad;

pub use engine::{normalize_lang, ModelOutput, Segment, SpeechModel, SttError, WhisperEngine};
pub use routes::create_router;
pub use state::AppState;
