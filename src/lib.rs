//! Path-prefix HTTP gateway.
//!
//! Routes requests to backends by the longest matching path prefix. The route
//! table is managed at runtime through a management API and persisted to
//! `routes.json` in the runtime directory.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{GatewayConfig, RuntimeConfig, RuntimeState};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::{BackendHandle, Route, RouteManager};
