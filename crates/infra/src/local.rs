//! Local filesystem collaborators.
//!
//! Config paths are resolved under a root directory, so a config written for
//! the transfer server (`/coast/stock`) reads `<root>/coast/stock`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};
use wheelsource_vendor::{FileLocation, FileSource};

use crate::error::SourceError;
use crate::source::{FeedSource, OnHandSource, csv_rows, decode};

fn io_error(path: &Path, source: std::io::Error) -> SourceError {
    SourceError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn read_text(path: &Path, encoding: &str) -> Result<String, SourceError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
        _ => io_error(path, e),
    })?;
    decode(&path.display().to_string(), encoding, &bytes)
}

/// Reads CSV files from a local directory tree.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    root: PathBuf,
}

impl LocalFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn newest_file(&self, dir: &Path, prune: bool) -> Result<PathBuf, SourceError> {
        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
            let entry = entry.map_err(|e| io_error(dir, e))?;
            let metadata = entry.metadata().map_err(|e| io_error(&entry.path(), e))?;
            if metadata.is_file() {
                let modified = metadata.modified().map_err(|e| io_error(&entry.path(), e))?;
                files.push((modified, entry.path()));
            }
        }

        let newest = files
            .iter()
            .max_by_key(|(modified, _)| *modified)
            .map(|(_, path)| path.clone())
            .ok_or_else(|| SourceError::EmptyDirectory(dir.display().to_string()))?;

        if prune {
            for (_, path) in files.iter().filter(|(_, path)| *path != newest) {
                warn!(path = %path.display(), "pruning stale file");
                fs::remove_file(path).map_err(|e| io_error(path, e))?;
            }
        }
        Ok(newest)
    }
}

impl FeedSource for LocalFileSource {
    fn fetch_rows(&self, source: &FileSource) -> Result<Vec<Vec<String>>, SourceError> {
        let path = match &source.location {
            FileLocation::File(path) => self.resolve(path),
            FileLocation::LatestInDirectory { dir, prune } => {
                self.newest_file(&self.resolve(dir), *prune)?
            }
        };
        let rows = csv_rows(&read_text(&path, &source.encoding)?);
        debug!(path = %path.display(), rows = rows.len(), "read feed file");
        Ok(rows)
    }
}

/// The on-hand report exported by the ERP to a local file.
#[derive(Debug, Clone)]
pub struct LocalOnHandFile {
    path: PathBuf,
    encoding: String,
}

impl LocalOnHandFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: wheelsource_vendor::source::DEFAULT_ENCODING.to_string(),
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }
}

impl OnHandSource for LocalOnHandFile {
    fn on_hand_report(&self) -> Result<String, SourceError> {
        read_text(&self.path, &self.encoding)
    }
}
