//! Continuous watch mode.
//!
//! This module runs the monitor loop in the foreground and wires up
//! graceful shutdown via SIGTERM/SIGINT. Proper daemonization is left
//! to systemd; the process just keeps polling until told to stop.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use crate::Cli;

/// Run the watch loop until a shutdown signal arrives.
pub async fn run(cli: &Cli, interval_override: Option<u64>) -> Result<()> {
    let config = crate::load_config(cli)?;

    let interval_seconds =
        interval_override.unwrap_or(config.monitor.check_interval_seconds).max(1);

    let mut monitor = crate::build_monitor(&config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    setup_signal_handlers(shutdown_tx);

    tracing::info!(
        "watching {} every {} seconds",
        config.router.host,
        interval_seconds
    );

    monitor
        .run(Duration::from_secs(interval_seconds), shutdown_rx)
        .await
}

/// Set up SIGTERM and SIGINT handlers for graceful shutdown.
fn setup_signal_handlers(shutdown: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_term = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    tracing::info!("Received SIGTERM");
                    let _ = shutdown_term.send(true);
                }
                Err(e) => tracing::error!("Failed to register SIGTERM handler: {e}"),
            }
        });
    }

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, shutting down");
                let _ = shutdown.send(true);
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {e}"),
        }
    });
}
