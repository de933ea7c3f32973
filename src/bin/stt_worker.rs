use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use voxbridge::config::WorkerConfig;
use voxbridge::stt::{create_router, AppState, WhisperEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("voxbridge=debug,stt_worker=debug,tower_http=debug")
        .init();

    let config = WorkerConfig::from_env();

    // Load the model exactly once; handlers share the handle read-only.
    let engine = WhisperEngine::load(&config)?;
    let state = AppState::new(Arc::new(engine), config.clone());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("starting STT worker on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
