//! Environment-driven configuration, read once at process startup.

use std::path::PathBuf;
use std::time::Duration;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Settings for the client-facing gateway service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    /// Base URL of the STT worker service.
    pub stt_base: String,
    /// Wall-clock timeout applied to every relayed transcription call.
    pub stt_timeout: Duration,
    /// Root of the per-session upload tree.
    pub upload_root: PathBuf,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let timeout_secs = env_or("STT_TIMEOUT", "25")
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(25.0);

        Self {
            port: env_or("GATEWAY_PORT", "8000").parse().unwrap_or(8000),
            stt_base: env_or("STT_BASE", "http://127.0.0.1:9001"),
            stt_timeout: Duration::from_secs_f64(timeout_secs),
            upload_root: PathBuf::from(env_or("UPLOAD_ROOT", "uploads")),
        }
    }
}

/// Settings for the STT worker service, fixed for the lifetime of the
/// process and reported verbatim by its health endpoint.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub port: u16,
    /// Path to the ggml model file loaded at startup.
    pub model_path: String,
    /// "cpu" keeps inference on the CPU, anything else enables GPU offload.
    pub device: String,
    /// Compute precision label. whisper.cpp bakes quantization into the
    /// model file, so this is informational only.
    pub compute: String,
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_or("STT_PORT", "9001").parse().unwrap_or(9001),
            model_path: env_or("WHISPER_MODEL", "models/ggml-base.bin"),
            device: env_or("WHISPER_DEVICE", "cpu"),
            compute: env_or("WHISPER_COMPUTE", "int8"),
        }
    }
}
