use std::sync::Arc;

use crate::config::WorkerConfig;

use super::engine::SpeechModel;

/// Shared worker state: the one-time-loaded model handle plus the
/// configuration echoed by the health endpoint.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn SpeechModel>,
    pub config: WorkerConfig,
}

impl AppState {
    pub fn new(model: Arc<dyn SpeechModel>, config: WorkerConfig) -> Self {
        Self { model, config }
    }
}
