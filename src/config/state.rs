//! Runtime state shared with the route manager.
//!
//! [`RuntimeConfig`] is the contract the routing core depends on: where the
//! runtime files live and which port the gateway listens on. [`RuntimeState`]
//! is the implementation used by the gateway binary.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::watch;

use crate::config::loader::{save_config, ConfigError};
use crate::config::schema::GatewayConfig;
use crate::config::validation::parse_port;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid gateway port {0:?}: expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("failed to persist gateway port: {0}")]
    Persist(#[from] ConfigError),
}

/// Runtime directory and gateway port provider.
pub trait RuntimeConfig: Send + Sync + std::fmt::Debug {
    /// Directory in which the routes file lives.
    fn runtime_path(&self) -> &Path;

    /// Current gateway port.
    fn gateway_port(&self) -> String;

    /// Change the gateway port.
    fn set_gateway_port(&self, port: &str) -> Result<(), StateError>;
}

/// Gateway runtime state backed by [`GatewayConfig`].
#[derive(Debug)]
pub struct RuntimeState {
    runtime_path: PathBuf,
    config: RwLock<GatewayConfig>,
    /// Where port changes are written back, if anywhere.
    config_path: Option<PathBuf>,
    port_tx: watch::Sender<String>,
}

impl RuntimeState {
    /// State that keeps port changes in memory only.
    pub fn new(config: GatewayConfig) -> Self {
        let (port_tx, _) = watch::channel(config.gateway.port.clone());
        Self {
            runtime_path: config.runtime_path.clone(),
            config: RwLock::new(config),
            config_path: None,
            port_tx,
        }
    }

    /// State that writes port changes back to `path`.
    pub fn with_config_file(config: GatewayConfig, path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            ..Self::new(config)
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> GatewayConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Receiver notified whenever the gateway port changes.
    pub fn subscribe_port(&self) -> watch::Receiver<String> {
        self.port_tx.subscribe()
    }
}

impl RuntimeConfig for RuntimeState {
    fn runtime_path(&self) -> &Path {
        &self.runtime_path
    }

    fn gateway_port(&self) -> String {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .gateway
            .port
            .clone()
    }

    fn set_gateway_port(&self, port: &str) -> Result<(), StateError> {
        let port = parse_port(port)
            .ok_or_else(|| StateError::InvalidPort(port.to_string()))?
            .to_string();

        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        if config.gateway.port == port {
            return Ok(());
        }

        let mut next = config.clone();
        next.gateway.port = port.clone();
        if let Some(path) = &self.config_path {
            save_config(path, &next)?;
        }
        *config = next;
        drop(config);

        tracing::info!(port = %port, "Gateway port changed");
        self.port_tx.send_replace(port);
        Ok(())
    }
}
