//! Route definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Durable path → target mapping, serialized as a flat JSON object.
pub type RouteTable = BTreeMap<String, String>;

/// Association between a literal path prefix and a backend base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Path prefix, e.g. `/api/v1`. Unique across the table.
    pub path: String,

    /// Backend base URL, e.g. `http://127.0.0.1:8080`.
    pub target: String,
}

impl Route {
    pub fn new(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
        }
    }
}
