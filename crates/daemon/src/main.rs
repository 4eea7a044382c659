// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Match backend daemon (mbd)
//!
//! Serves the backend API over TCP, handing match requests to workers
//! through the state store.

use std::time::Duration;

use mb_daemon::lifecycle::{self, Config, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// How often expired match objects are dropped from the store
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env(&args)?;

    let _log_guard = setup_logging(&config)?;

    match &config.config_path {
        Some(path) => info!("Starting mbd with config {}", path.display()),
        None => info!("Starting mbd with default config"),
    }

    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready, listening on {}", daemon.local_addr()?);

    let shutdown = CancellationToken::new();
    let server = tokio::spawn(mb_daemon::serve(
        daemon.listener,
        daemon.backend,
        shutdown.clone(),
    ));

    let mut purge = tokio::time::interval(PURGE_INTERVAL);
    loop {
        tokio::select! {
            _ = purge.tick() => {
                lifecycle::purge_expired(&daemon.store);
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    shutdown.cancel();
    if let Err(e) = server.await {
        error!("Server task failed: {}", e);
    }

    info!(
        uptime_secs = daemon.start_time.elapsed().as_secs(),
        "Daemon stopped"
    );
    Ok(())
}

/// Install the subscriber. Logs go to `log_path` when set, stderr otherwise.
fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (non_blocking, guard) = match &config.log_path {
        Some(log_path) => {
            let dir = log_path
                .parent()
                .ok_or_else(|| LifecycleError::NoLogDir(log_path.clone()))?;
            std::fs::create_dir_all(dir)?;
            let file_name = log_path
                .file_name()
                .ok_or_else(|| LifecycleError::NoLogDir(log_path.clone()))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
