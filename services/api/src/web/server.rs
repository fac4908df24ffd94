//! services/api/src/web/server.rs
//!
//! The accept loop. It is `axum::serve` with two additions: keep-alive
//! connections that stay idle past `idle_timeout` are closed, and draining
//! after shutdown is bounded by `shutdown_timeout`.

use crate::config::ServerConfig;
use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Serves `app` until `shutdown` is cancelled, then drains open connections.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    config: &ServerConfig,
    shutdown: CancellationToken,
) {
    let mut builder = Builder::new(TokioExecutor::new());
    // The header read timer also runs while a kept-alive connection waits for
    // its next request.
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(config.idle_timeout);
    let graceful = GracefulShutdown::new();

    loop {
        let (stream, remote_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(connection) => connection,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            },
            () = shutdown.cancelled() => break,
        };

        debug!("Connection from {} accepted", remote_addr);
        let service = TowerToHyperService::new(app.clone());
        let connection = builder
            .serve_connection_with_upgrades(TokioIo::new(stream), service)
            .into_owned();
        let connection = graceful.watch(connection);
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("Connection from {} closed: {}", remote_addr, e);
            }
        });
    }

    drop(listener);
    info!(
        "Shutdown requested; waiting up to {:?} for in-flight requests",
        config.shutdown_timeout
    );
    match tokio::time::timeout(config.shutdown_timeout, graceful.shutdown()).await {
        Ok(()) => info!("All connections drained."),
        Err(_) => warn!("Grace period elapsed; abandoning remaining requests."),
    }
}
