use std::net::SocketAddr;

use anyhow::Result;
use tracing::{info, warn};

use voxbridge::config::GatewayConfig;
use voxbridge::gateway::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("voxbridge=debug,gateway=debug,tower_http=debug")
        .init();

    let config = GatewayConfig::from_env();
    info!("upload root: {}", config.upload_root.display());
    info!(
        "STT worker at {} (timeout {:?})",
        config.stt_base, config.stt_timeout
    );

    std::fs::create_dir_all(&config.upload_root)?;

    let state = AppState::new(&config)?;
    if !state.stt.health_check().await.unwrap_or(false) {
        warn!("STT worker at {} is not reachable yet", config.stt_base);
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("starting gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
