//! In-memory collaborators.
//!
//! Intended for tests/dev. Files live in a path-keyed map with a modification
//! timestamp so directory reads behave like the real transfer server.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::warn;
use wheelsource_inventory::InventoryEntry;
use wheelsource_vendor::{FileLocation, FileSource};

use crate::error::{SinkError, SourceError};
use crate::sink::SnapshotSink;
use crate::source::{FeedSource, OnHandSource};

#[derive(Debug, Clone)]
struct StoredFile {
    rows: Vec<Vec<String>>,
    modified: DateTime<Utc>,
}

/// Path-keyed rows, already parsed (no header).
#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    files: RwLock<BTreeMap<String, StoredFile>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, path: impl Into<String>, rows: Vec<Vec<String>>) -> Result<(), SourceError> {
        self.put_at(path, rows, Utc::now())
    }

    pub fn put_at(
        &self,
        path: impl Into<String>,
        rows: Vec<Vec<String>>,
        modified: DateTime<Utc>,
    ) -> Result<(), SourceError> {
        let mut files = self.files.write().map_err(|_| SourceError::LockPoisoned)?;
        files.insert(path.into(), StoredFile { rows, modified });
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.read().map(|files| files.contains_key(path)).unwrap_or(false)
    }

    fn in_directory<'a>(
        files: &'a BTreeMap<String, StoredFile>,
        dir: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a StoredFile)> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        files.iter().filter(move |(path, _)| {
            path.strip_prefix(&prefix)
                .is_some_and(|name| !name.is_empty() && !name.contains('/'))
        })
    }
}

impl FeedSource for InMemoryFileStore {
    fn fetch_rows(&self, source: &FileSource) -> Result<Vec<Vec<String>>, SourceError> {
        match &source.location {
            FileLocation::File(path) => {
                let files = self.files.read().map_err(|_| SourceError::LockPoisoned)?;
                files
                    .get(path)
                    .map(|file| file.rows.clone())
                    .ok_or_else(|| SourceError::NotFound(path.clone()))
            }
            FileLocation::LatestInDirectory { dir, prune } => {
                let mut files = self.files.write().map_err(|_| SourceError::LockPoisoned)?;
                let (newest, rows) = Self::in_directory(&files, dir)
                    .max_by_key(|(_, file)| file.modified)
                    .map(|(path, file)| (path.clone(), file.rows.clone()))
                    .ok_or_else(|| SourceError::EmptyDirectory(dir.clone()))?;

                if *prune {
                    let stale: Vec<String> = Self::in_directory(&files, dir)
                        .filter(|(path, _)| **path != newest)
                        .map(|(path, _)| path.clone())
                        .collect();
                    for path in stale {
                        warn!(path = %path, "pruning stale file");
                        files.remove(&path);
                    }
                }
                Ok(rows)
            }
        }
    }
}

/// A fixed on-hand report.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOnHand {
    report: String,
}

impl InMemoryOnHand {
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
        }
    }
}

impl OnHandSource for InMemoryOnHand {
    fn on_hand_report(&self) -> Result<String, SourceError> {
        Ok(self.report.clone())
    }
}

/// Keeps the last published snapshot. Each publish replaces the previous one.
#[derive(Debug, Default)]
pub struct InMemorySnapshotSink {
    entries: RwLock<Vec<InventoryEntry>>,
    publishes: RwLock<usize>,
}

impl InMemorySnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<InventoryEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn publishes(&self) -> usize {
        self.publishes.read().map(|p| *p).unwrap_or(0)
    }
}

impl SnapshotSink for InMemorySnapshotSink {
    fn replace(&self, entries: &[InventoryEntry]) -> Result<(), SinkError> {
        let mut stored = self.entries.write().map_err(|_| SinkError::LockPoisoned)?;
        stored.clear();
        stored.extend_from_slice(entries);
        *self.publishes.write().map_err(|_| SinkError::LockPoisoned)? += 1;
        Ok(())
    }
}
