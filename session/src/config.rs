//! Database configuration.

use std::path::{Path, PathBuf};

/// Configuration for opening a [`Db`](crate::Db).
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Journal file. `None` keeps the journal in memory.
    pub path: Option<PathBuf>,
    /// Sync the journal to disk after every write.
    pub sync_on_commit: bool,
    /// Create the journal file if it does not exist.
    pub create_if_missing: bool,
    /// Compact the journal after opening.
    pub compact_on_open: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: None,
            sync_on_commit: true,
            create_if_missing: true,
            compact_on_open: false,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory configuration.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed configuration with default options.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::default().with_path(path)
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_sync_on_commit(mut self, enabled: bool) -> Self {
        self.sync_on_commit = enabled;
        self
    }

    pub fn with_create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    pub fn with_compact_on_open(mut self, enabled: bool) -> Self {
        self.compact_on_open = enabled;
        self
    }

    /// Returns true if the journal is kept in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}
