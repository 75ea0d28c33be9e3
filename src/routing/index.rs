//! In-memory route index.
//!
//! # Responsibilities
//! - Hold the route table together with one backend handle per valid target
//! - Answer longest-prefix queries for request paths
//! - Upsert routes without disturbing the rest of the table
//!
//! # Design Decisions
//! - Handle keys are kept in a list sorted longest first, so lookup never sorts
//! - Entries whose target does not parse stay in the table but get no handle
//! - The index is plain data; sharing and locking belong to the manager

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::backend::{BackendHandle, InvalidTargetError};
use crate::routing::route::{Route, RouteTable};

/// Path → target table paired with its path → backend handle mapping.
#[derive(Debug, Clone, Default)]
pub struct RouteIndex {
    table: RouteTable,
    handles: HashMap<String, Arc<BackendHandle>>,
    /// Keys of `handles`, in match priority order.
    ordered: Vec<String>,
}

/// Longer paths first; equal lengths in lexicographic order.
fn match_priority(a: &str, b: &str) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| a.cmp(b))
}

impl RouteIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a loaded table.
    ///
    /// Every entry is kept in the table. Entries whose target is not a valid
    /// URL are logged and get no handle, so they never resolve.
    pub fn from_table(table: RouteTable) -> Self {
        let mut index = Self::new();
        for (path, target) in table {
            match BackendHandle::parse(&target) {
                Ok(handle) => index.put_handle(&path, Arc::new(handle)),
                Err(e) => tracing::warn!(path = %path, error = %e, "Skipping route with invalid target"),
            }
            index.table.insert(path, target);
        }
        index
    }

    /// Insert or replace the route for `route.path`.
    ///
    /// On an invalid target the index is left untouched.
    pub fn insert(&mut self, route: Route) -> Result<(), InvalidTargetError> {
        let handle = BackendHandle::parse(&route.target)?;
        self.put_handle(&route.path, Arc::new(handle));
        self.table.insert(route.path, route.target);
        Ok(())
    }

    fn put_handle(&mut self, path: &str, handle: Arc<BackendHandle>) {
        if self.handles.insert(path.to_string(), handle).is_none() {
            let pos = self
                .ordered
                .binary_search_by(|probe| match_priority(probe, path))
                .unwrap_or_else(|pos| pos);
            self.ordered.insert(pos, path.to_string());
        }
    }

    /// Find the backend for the longest stored prefix of `request_path`.
    pub fn resolve(&self, request_path: &str) -> Option<Arc<BackendHandle>> {
        self.ordered
            .iter()
            .find(|prefix| request_path.starts_with(prefix.as_str()))
            .and_then(|prefix| self.handles.get(prefix))
            .cloned()
    }

    /// Current routes, ordered by path.
    pub fn list(&self) -> Vec<Route> {
        self.table
            .iter()
            .map(|(path, target)| Route::new(path.clone(), target.clone()))
            .collect()
    }

    /// The durable path → target table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
