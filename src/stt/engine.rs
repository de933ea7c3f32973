use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

use crate::config::WorkerConfig;

/// One transcribed span of speech, offsets in seconds from the start of the
/// submitted chunk.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Result of a single inference call.
#[derive(Debug, Clone, Default)]
pub struct ModelOutput {
    pub segments: Vec<Segment>,
    /// Language code as reported by the model, if it detected one.
    pub language: Option<String>,
}

#[derive(Debug, Error)]
pub enum SttError {
    #[error("failed to read audio chunk: {0}")]
    Io(#[from] std::io::Error),
    #[error("audio decode failed: {0}")]
    Decode(String),
    #[error("resampling failed: {0}")]
    Resample(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Speech-recognition model seam.
///
/// Implementations receive 16 kHz mono f32 PCM and return timestamped
/// segments plus the detected language. The handle is constructed once at
/// process start and injected into request handlers read-only.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    async fn transcribe(&self, samples: Vec<f32>) -> Result<ModelOutput, SttError>;
}

/// whisper.cpp-backed model.
///
/// The context is loaded once at startup. The inference state is not safe
/// for parallel use, so calls serialize on the mutex even though the HTTP
/// layer accepts them concurrently.
pub struct WhisperEngine {
    state: Mutex<WhisperState>,
}

impl WhisperEngine {
    pub fn load(config: &WorkerConfig) -> Result<Self, SttError> {
        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu(config.device != "cpu");

        info!(
            "loading whisper model {} (device={}, compute={})",
            config.model_path, config.device, config.compute
        );
        let context = WhisperContext::new_with_params(&config.model_path, context_params)
            .map_err(|e| SttError::Inference(format!("model load: {e}")))?;
        let state = context
            .create_state()
            .map_err(|e| SttError::Inference(format!("state init: {e}")))?;
        whisper_rs::install_logging_hooks();

        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Decoding configuration for one chunk: greedy sampling favours latency
    /// over accuracy, the language is auto-detected, and no text context is
    /// carried over since every chunk is transcribed independently.
    fn request_params() -> FullParams<'static, 'static> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_special(false);
        params.set_print_timestamps(false);
        params.set_debug_mode(false);
        params.set_no_context(true);
        params.set_suppress_nst(true);
        params.set_language(None);
        params
    }
}

#[async_trait]
impl SpeechModel for WhisperEngine {
    async fn transcribe(&self, samples: Vec<f32>) -> Result<ModelOutput, SttError> {
        let mut state = self.state.lock().await;

        tokio::task::block_in_place(|| {
            state
                .full(Self::request_params(), &samples)
                .map_err(|e| SttError::Inference(e.to_string()))?;

            let mut segments = Vec::new();
            for segment in state.as_iter() {
                let text = segment.to_str_lossy().unwrap_or_default();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                // whisper reports timestamps in centiseconds
                segments.push(Segment {
                    start: segment.start_timestamp() as f64 / 100.0,
                    end: segment.end_timestamp() as f64 / 100.0,
                    text: text.to_string(),
                });
            }

            let language = Some(state.full_lang_id_from_state())
                .and_then(whisper_rs::get_lang_str)
                .map(ToString::to_string);

            debug!(
                "transcribed {} segments (lang={:?})",
                segments.len(),
                language
            );
            Ok(ModelOutput { segments, language })
        })
    }
}

/// Collapse the model-reported language code into the relay's two-letter
/// convention. Different model builds disagree on whether Hebrew comes back
/// as "he", "heb" or "Hebrew", so match prefixes case-insensitively.
pub fn normalize_lang(code: Option<&str>) -> String {
    let Some(code) = code else {
        return "auto".to_string();
    };
    let lower = code.trim().to_lowercase();
    if lower.is_empty() {
        return "auto".to_string();
    }
    if lower.starts_with("heb") {
        return "he".to_string();
    }
    if lower.starts_with("ara") {
        return "ar".to_string();
    }
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_codes_collapse_to_two_letters() {
        assert_eq!(normalize_lang(Some("Hebrew")), "he");
        assert_eq!(normalize_lang(Some("heb")), "he");
        assert_eq!(normalize_lang(Some("Arabic")), "ar");
        assert_eq!(normalize_lang(Some("ara")), "ar");
    }

    #[test]
    fn other_lang_codes_are_lowercased() {
        assert_eq!(normalize_lang(Some("EN")), "en");
        assert_eq!(normalize_lang(Some("pt")), "pt");
    }

    #[test]
    fn missing_lang_defaults_to_auto() {
        assert_eq!(normalize_lang(None), "auto");
        assert_eq!(normalize_lang(Some("")), "auto");
        assert_eq!(normalize_lang(Some("  ")), "auto");
    }
}
