use std::time::Duration;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// HTTP client for the STT worker service.
///
/// One client is built at startup with the configured request timeout; it is
/// shared read-only across all gateway handlers.
#[derive(Debug, Clone)]
pub struct SttClient {
    client: Client,
    base_url: String,
}

impl SttClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Forwards one audio chunk to the worker and returns its JSON body
    /// untouched. Connect failures, timeouts and non-2xx statuses all
    /// surface as `reqwest::Error`; the caller decides how to envelope them.
    pub async fn transcribe_chunk(
        &self,
        audio: Vec<u8>,
        filename: Option<String>,
        session_id: &str,
        start_ms: i64,
    ) -> Result<Value, reqwest::Error> {
        let filename = filename.unwrap_or_else(|| "chunk.m4a".to_string());
        debug!(
            "relaying {} byte chunk ({}) for session {:?}",
            audio.len(),
            filename,
            session_id
        );

        let part = Part::bytes(audio)
            .file_name(filename)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", part)
            .text("session_id", session_id.to_string())
            .text("start_ms", start_ms.to_string());

        let response = self
            .client
            .post(format!("{}/transcribe-chunk", self.base_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        response.json().await
    }

    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}
