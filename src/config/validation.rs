//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, timeouts)
//! - Validate listener addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gateway.port {0:?} is not a port between 1 and 65535")]
    GatewayPort(String),

    #[error("gateway.bind_host must not be empty")]
    EmptyBindHost,

    #[error("management.bind_address {0:?} is not a socket address")]
    ManagementAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,
}

/// Parse a textual port, rejecting 0 and anything outside u16.
pub fn parse_port(port: &str) -> Option<u16> {
    port.trim().parse::<u16>().ok().filter(|p| *p != 0)
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if parse_port(&config.gateway.port).is_none() {
        errors.push(ValidationError::GatewayPort(config.gateway.port.clone()));
    }
    if config.gateway.bind_host.trim().is_empty() {
        errors.push(ValidationError::EmptyBindHost);
    }
    if config.management.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::ManagementAddress(config.management.bind_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
