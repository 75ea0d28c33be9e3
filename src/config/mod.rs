//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, defaults when absent)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated)
//!     → state.rs (RuntimeState, shared via Arc)
//!
//! On port change:
//!     state.rs validates the port
//!     → loader.rs writes the config file back
//!     → watch channel notifies the gateway listener
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The routing core only sees the `RuntimeConfig` trait

pub mod loader;
pub mod schema;
pub mod state;
pub mod validation;

pub use loader::{load_config, load_optional, save_config, ConfigError};
pub use schema::{GatewayConfig, GatewayListenerConfig, ManagementConfig, TimeoutConfig};
pub use state::{RuntimeConfig, RuntimeState, StateError};
