//! Route table persistence.
//!
//! The table is stored as a single JSON object mapping path to target,
//! readable and writable by the owner only.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::routing::route::RouteTable;

/// File name of the route table inside the runtime directory.
pub const ROUTES_FILE: &str = "routes.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("failed to serialize route table: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Reads and writes the route table file.
#[derive(Debug, Clone)]
pub struct RouteStore {
    path: PathBuf,
}

impl RouteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `routes.json` inside the given runtime directory.
    pub fn in_dir(runtime_path: &Path) -> Self {
        Self::new(runtime_path.join(ROUTES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table, reporting why it could not be read.
    pub fn try_load(&self) -> Result<RouteTable, StoreError> {
        let content = fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Load the table, falling back to an empty one.
    ///
    /// A missing or malformed file is never fatal; it is logged and the
    /// gateway starts without routes.
    pub fn load(&self) -> RouteTable {
        match self.try_load() {
            Ok(table) => {
                tracing::debug!(path = %self.path.display(), routes = table.len(), "Route table read");
                table
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load route table, starting empty");
                RouteTable::new()
            }
        }
    }

    /// Replace the file contents with `table`.
    ///
    /// The table is written to a temporary sibling first and renamed into
    /// place, so readers never observe a partially written file.
    pub fn save(&self, table: &RouteTable) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(table).map_err(StoreError::Serialize)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        write_private(&tmp_path, &content).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            write_err(source)
        })?;

        tracing::debug!(path = %self.path.display(), routes = table.len(), "Route table saved");
        Ok(())
    }
}

/// Write `content` to `path` with owner-only permissions.
fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    // `mode` only applies on creation; a stale temp file keeps its old bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content)?;
    file.sync_all()
}
