//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     routes.json
//!     → store.rs (load path → target table, empty on failure)
//!     → index.rs (parse targets into backend handles, skip bad ones)
//!     → manager.rs (publish index snapshot)
//!
//! Request:
//!     request path
//!     → manager.rs (load current snapshot, lock-free)
//!     → index.rs (longest stored prefix wins)
//!     → Return: BackendHandle or None
//!
//! Route creation:
//!     Route
//!     → index.rs (validate target, upsert into a copy of the index)
//!     → store.rs (persist the whole table)
//!     → manager.rs (swap in the new snapshot)
//! ```
//!
//! # Design Decisions
//! - Literal prefix matching only, no wildcards or regex
//! - Deterministic: longest prefix first, ties broken lexicographically
//! - Index snapshots are immutable; writers publish a new one
//! - A route is only published after it has been persisted

pub mod backend;
pub mod index;
pub mod manager;
pub mod route;
pub mod store;

pub use backend::{BackendHandle, InvalidTargetError};
pub use index::RouteIndex;
pub use manager::{RouteError, RouteManager};
pub use route::{Route, RouteTable};
pub use store::{RouteStore, StoreError, ROUTES_FILE};
