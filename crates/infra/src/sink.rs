//! Snapshot persistence seam.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use wheelsource_inventory::InventoryEntry;

use crate::error::SinkError;

/// Consumer of [`InventoryEntry`] snapshots with delete-then-write semantics:
/// a publish fully replaces whatever the previous run stored.
pub trait SnapshotSink {
    fn replace(&self, entries: &[InventoryEntry]) -> Result<(), SinkError>;
}

impl<T: SnapshotSink + ?Sized> SnapshotSink for &T {
    fn replace(&self, entries: &[InventoryEntry]) -> Result<(), SinkError> {
        (**self).replace(entries)
    }
}

/// Writes the snapshot as a JSON array to one file.
///
/// The file is written next to its destination and renamed over it, so readers
/// never see a partial snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SnapshotSink for JsonFileSink {
    fn replace(&self, entries: &[InventoryEntry]) -> Result<(), SinkError> {
        let json = serde_json::to_vec_pretty(entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;
        info!(path = %self.path.display(), entries = entries.len(), "snapshot written");
        Ok(())
    }
}
