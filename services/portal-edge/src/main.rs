//! Portal Edge - Main Entry Point

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use portal_edge::shutdown::{serve_with_graceful_shutdown, wait_for_signal};
use portal_edge::{AppState, Config, build_router};
use rust_common::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    let tracing_config = TracingConfig::default()
        .with_service_name("portal-edge")
        .with_log_level(config.log_level.clone())
        .with_json_output(config.log_json);
    init_tracing(&tracing_config)?;

    info!("Starting Portal Edge");

    let addr = config.bind_address();
    let drain_timeout = config.shutdown_timeout();

    info!(
        origin = %config.backend_api_url,
        api_prefix = %config.api_prefix,
        static_dir = %config.static_dir.display(),
        verify_signatures = config.jwt_verify_secret.is_some(),
        "Configuration loaded"
    );

    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Portal Edge listening on {}", addr);

    serve_with_graceful_shutdown(listener, app, wait_for_signal(), drain_timeout).await?;

    info!("Portal Edge stopped");
    Ok(())
}
