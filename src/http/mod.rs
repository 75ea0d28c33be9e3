//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → routing (longest-prefix backend lookup)
//!     → request.rs (strip hop-by-hop headers, X-Forwarded-For)
//!     → backend via hyper-util client
//!     → response streamed back to the client
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_FORWARDED_FOR, X_REQUEST_ID};
pub use server::GatewayServer;
