//! Two-tier audio transcription backend.
//!
//! The `gateway` binary fronts client applications: it manages per-session
//! upload storage and relays transcription requests to the STT worker. The
//! `stt-worker` binary loads a whisper.cpp model once at startup and exposes
//! a single transcription endpoint over HTTP.

pub mod config;
pub mod gateway;
pub mod stt;

pub use config::{GatewayConfig, WorkerConfig};
