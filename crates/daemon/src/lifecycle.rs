// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use mb_adapters::TracedStateStore;
use mb_core::{BackendConfig, ConfigError, TracingMetrics, UuidIdGen};
use mb_engine::{Backend, BackendDeps};
use mb_storage::MemoryStore;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

/// Backend with concrete adapter types (store wrapped with tracing)
pub type DaemonBackend = Backend<TracedStateStore<MemoryStore>, UuidIdGen, TracingMetrics>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path the backend configuration was read from, if any
    pub config_path: Option<PathBuf>,
    /// Address to listen on
    pub listen_addr: SocketAddr,
    /// Daemon log file; stderr when unset
    pub log_path: Option<PathBuf>,
    pub backend: BackendConfig,
}

impl Config {
    /// Build the config from a config file path and the raw override values
    /// of `MB_PORT` and `MB_LOG_PATH`.
    pub fn resolve(
        config_path: Option<PathBuf>,
        port_override: Option<String>,
        log_path: Option<String>,
    ) -> Result<Self, LifecycleError> {
        let mut backend = match &config_path {
            Some(path) => BackendConfig::load(path)?,
            None => BackendConfig::default(),
        };
        if let Some(port) = port_override.filter(|p| !p.is_empty()) {
            backend.port = port
                .parse()
                .map_err(|_| LifecycleError::InvalidPort(port.clone()))?;
        }

        Ok(Self {
            config_path,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], backend.port)),
            log_path: log_path.filter(|p| !p.is_empty()).map(PathBuf::from),
            backend,
        })
    }

    /// Read the config path from `args` (first argument) or `MB_CONFIG`
    pub fn from_env(args: &[String]) -> Result<Self, LifecycleError> {
        let config_path = args
            .get(1)
            .cloned()
            .or_else(|| std::env::var("MB_CONFIG").ok())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self::resolve(
            config_path,
            std::env::var("MB_PORT").ok(),
            std::env::var("MB_LOG_PATH").ok(),
        )
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    pub listener: TcpListener,
    pub backend: DaemonBackend,
    /// The store behind the backend, kept for housekeeping
    pub store: MemoryStore,
    pub start_time: Instant,
}

impl DaemonState {
    pub fn local_addr(&self) -> Result<SocketAddr, LifecycleError> {
        Ok(self.listener.local_addr()?)
    }
}

/// Drop expired match objects
pub fn purge_expired(store: &MemoryStore) -> usize {
    let purged = store.purge_expired();
    if purged > 0 {
        info!(purged, "Purged expired match objects");
    }
    purged
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid port in MB_PORT: {0}")]
    InvalidPort(String),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("Could not determine log directory for {0}")]
    NoLogDir(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon: build the backend, then bind the listener
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    let backoff = config.backend.backoff_policy();
    info!(
        queue = %config.backend.queue,
        ttl = ?config.backend.match_object_ttl,
        backoff = %backoff,
        "Backend configured"
    );

    let store = MemoryStore::new();
    let backend = Backend::new(
        BackendDeps {
            store: TracedStateStore::new(store.clone()),
            ids: UuidIdGen,
            metrics: TracingMetrics,
        },
        &config.backend,
    );

    // Bind last, so a bad config never accepts connections
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.listen_addr, e))?;

    info!("Daemon started on {}", listener.local_addr()?);

    Ok(DaemonState {
        config: config.clone(),
        listener,
        backend,
        store,
        start_time: Instant::now(),
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
