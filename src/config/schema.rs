//! Configuration schema definitions.
//!
//! All sections default, so an empty file (or no file) yields a working gateway.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Directory holding runtime files (`routes.json`, `management.url`).
    pub runtime_path: PathBuf,

    /// Public gateway listener.
    pub gateway: GatewayListenerConfig,

    /// Management API listener.
    pub management: ManagementConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            runtime_path: PathBuf::from("./run"),
            gateway: GatewayListenerConfig::default(),
            management: ManagementConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Gateway listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayListenerConfig {
    /// Listening port, kept as a string because it is exchanged as text.
    pub port: String,

    /// Host or IP the gateway binds to.
    pub bind_host: String,
}

impl Default for GatewayListenerConfig {
    fn default() -> Self {
        Self {
            port: "8080".to_string(),
            bind_host: "0.0.0.0".to_string(),
        }
    }
}

/// Management API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// Bind address; port 0 picks a free port.
    pub bind_address: String,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for a forwarded request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}
