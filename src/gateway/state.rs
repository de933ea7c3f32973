use std::sync::Arc;

use crate::config::GatewayConfig;

use super::store::UploadStore;
use super::stt_client::SttClient;

/// Shared application state for gateway handlers.
///
/// The gateway keeps no per-request state in memory; everything here is
/// constructed once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UploadStore>,
    pub stt: Arc<SttClient>,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            store: Arc::new(UploadStore::new(&config.upload_root)),
            stt: Arc::new(SttClient::new(&config.stt_base, config.stt_timeout)?),
        })
    }
}
