//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Build runtime state and the route manager
//! - Bind the management API and publish its URL
//! - Run the gateway and management servers until shutdown
//!
//! # Design Decisions
//! - Fail fast: config and initial bind errors are fatal
//! - A missing or corrupt routes file is not an error
//! - Listeners start last (traffic only when ready)

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin::setup_management_router;
use crate::config::{load_optional, ConfigError, GatewayConfig, RuntimeConfig, RuntimeState};
use crate::http::GatewayServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::RouteManager;

/// File in the runtime directory holding the management API base URL.
pub const MANAGEMENT_URL_FILE: &str = "management.url";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {what} on {address}: {source}")]
    Bind {
        what: &'static str,
        address: String,
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    RuntimeFile { path: PathBuf, source: io::Error },

    #[error("server error: {0}")]
    Serve(#[from] io::Error),

    #[error("gateway task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run the gateway with the configuration at `config_path` until `shutdown`.
pub async fn run(config_path: &Path, shutdown: Shutdown) -> Result<(), StartupError> {
    let state = Arc::new(load_state(config_path)?);
    let config = state.config();
    tracing::info!(
        runtime_path = %config.runtime_path.display(),
        gateway_port = %config.gateway.port,
        management_address = %config.management.bind_address,
        "Configuration loaded"
    );

    let runtime: Arc<dyn RuntimeConfig> = state.clone();
    let routes = Arc::new(tokio::task::spawn_blocking(move || RouteManager::new(runtime)).await?);

    let management_listener = bind("management API", config.management.bind_address.clone()).await?;
    let management_addr = management_listener.local_addr()?;
    let gateway_listener = bind(
        "gateway",
        format!("{}:{}", config.gateway.bind_host, state.gateway_port()),
    )
    .await?;

    write_management_url(state.runtime_path(), management_addr)?;
    tracing::info!(address = %management_addr, "Management API listening");

    let gateway = GatewayServer::new(routes.clone(), &config.timeouts);
    let gateway_task = tokio::spawn(gateway.run_on_port(
        gateway_listener,
        config.gateway.bind_host.clone(),
        state.subscribe_port(),
        shutdown.clone(),
    ));

    let management = {
        let shutdown = shutdown.clone();
        axum::serve(management_listener, setup_management_router(routes))
            .with_graceful_shutdown(async move { shutdown.wait().await })
    };

    let gateway = async {
        gateway_task.await??;
        Ok::<(), StartupError>(())
    };

    let result = tokio::try_join!(async { management.await.map_err(StartupError::from) }, gateway);
    if result.is_err() {
        shutdown.trigger();
    }
    result.map(|_| ())
}

/// Runtime state for `config_path`.
///
/// Port changes are written back only when the file existed; without one the
/// gateway runs on defaults and keeps changes in memory.
pub fn load_state(config_path: &Path) -> Result<RuntimeState, StartupError> {
    match load_optional(config_path)? {
        Some(config) => Ok(RuntimeState::with_config_file(config, config_path)),
        None => {
            tracing::info!(path = %config_path.display(), "Config file not found, using defaults");
            Ok(RuntimeState::new(GatewayConfig::default()))
        }
    }
}

async fn bind(what: &'static str, address: String) -> Result<TcpListener, StartupError> {
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { what, address, source })
}

/// Publish the management API base URL for local tooling.
pub fn write_management_url(runtime_path: &Path, addr: SocketAddr) -> Result<PathBuf, StartupError> {
    let path = runtime_path.join(MANAGEMENT_URL_FILE);
    let runtime_err = |source| StartupError::RuntimeFile {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(runtime_path).map_err(runtime_err)?;
    fs::write(&path, format!("http://{}", addr)).map_err(runtime_err)?;
    Ok(path)
}
