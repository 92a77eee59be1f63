//! Graceful Shutdown Module
//!
//! Stops accepting connections on SIGINT/SIGTERM and gives in-flight requests
//! a bounded window to finish.

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Waits for SIGTERM or SIGINT
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Serves `app` until `shutdown` resolves, then drains in-flight requests for
/// at most `drain_timeout`.
pub async fn serve_with_graceful_shutdown<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    drain_timeout: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, mut signalled_rx) = watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = signalled_tx.send(true);
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            info!("Server stopped");
            return result;
        }
        _ = signalled_rx.wait_for(|signalled| *signalled) => {
            info!(timeout_secs = drain_timeout.as_secs(), "Draining in-flight requests");
        }
    }

    if let Ok(result) = tokio::time::timeout(drain_timeout, &mut server).await {
        info!("All requests completed gracefully");
        result
    } else {
        warn!("Shutdown timeout reached, dropping remaining connections");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_server_stops_when_shutdown_resolves() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let app = Router::new().route("/", get(|| async { "ok" }));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve_with_graceful_shutdown(listener, app, async {}, Duration::from_secs(1)),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
