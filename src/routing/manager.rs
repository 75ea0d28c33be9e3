//! Route manager facade.
//!
//! # Responsibilities
//! - Load the persisted table at construction
//! - Validate, persist and publish new routes
//! - Resolve request paths to backends
//! - Pass gateway port reads/writes through to the runtime config
//!
//! # Design Decisions
//! - Readers load an immutable index snapshot (arc-swap), never blocking
//! - Writers are serialized by a mutex held across build, persist, publish
//! - A route is published only after the table containing it was saved,
//!   so memory and disk never diverge on a failed write

use arc_swap::ArcSwap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::config::state::{RuntimeConfig, StateError};
use crate::routing::backend::{BackendHandle, InvalidTargetError};
use crate::routing::index::RouteIndex;
use crate::routing::route::Route;
use crate::routing::store::{RouteStore, StoreError};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTargetError),

    #[error("failed to persist route table: {0}")]
    Persist(#[from] StoreError),

    #[error(transparent)]
    Port(#[from] StateError),
}

/// Owns the route index and its backing store.
#[derive(Debug)]
pub struct RouteManager {
    index: ArcSwap<RouteIndex>,
    writer: Mutex<()>,
    store: RouteStore,
    runtime: Arc<dyn RuntimeConfig>,
}

impl RouteManager {
    /// Load `routes.json` from the runtime directory and build the index.
    ///
    /// Never fails: an unreadable file yields an empty table and entries with
    /// invalid targets are skipped.
    pub fn new(runtime: Arc<dyn RuntimeConfig>) -> Self {
        let store = RouteStore::in_dir(runtime.runtime_path());
        let index = RouteIndex::from_table(store.load());

        tracing::info!(
            path = %store.path().display(),
            routes = index.len(),
            "Route table loaded"
        );

        Self {
            index: ArcSwap::from_pointee(index),
            writer: Mutex::new(()),
            store,
            runtime,
        }
    }

    /// Create or replace a route and persist the whole table.
    ///
    /// On error nothing changes, neither in memory nor on disk.
    pub fn create_route(&self, route: Route) -> Result<(), RouteError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.index.load_full();
        let mut next = RouteIndex::clone(&current);
        next.insert(route.clone())?;

        self.store.save(next.table())?;
        self.index.store(Arc::new(next));

        tracing::info!(path = %route.path, target = %route.target, "Route created");
        Ok(())
    }

    /// Snapshot of all routes, ordered by path.
    pub fn get_routes(&self) -> Vec<Route> {
        self.index.load().list()
    }

    /// Backend for the longest stored prefix of `path`, if any.
    pub fn get_proxy(&self, path: &str) -> Option<Arc<BackendHandle>> {
        self.index.load().resolve(path)
    }

    pub fn get_gateway_port(&self) -> String {
        self.runtime.gateway_port()
    }

    pub fn set_gateway_port(&self, port: &str) -> Result<(), RouteError> {
        self.runtime.set_gateway_port(port)?;
        Ok(())
    }

    /// Location of the routes file.
    pub fn routes_file(&self) -> &Path {
        self.store.path()
    }
}
