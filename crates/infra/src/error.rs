use thiserror::Error;
use wheelsource_core::DomainError;
use wheelsource_vendor::ConfigError;

/// Failure to read from an upstream collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("directory {0} contains no files")]
    EmptyDirectory(String),

    #[error("unsupported encoding {encoding:?} for {path}")]
    UnsupportedEncoding { path: String, encoding: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path} as {encoding}")]
    Decode { path: String, encoding: String },

    #[error("lock poisoned")]
    LockPoisoned,
}

/// Failure to publish a snapshot.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("lock poisoned")]
    LockPoisoned,
}

/// Failure while preparing or publishing a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("{context}: {source}")]
    Source {
        context: String,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RunError {
    pub(crate) fn fetch(context: impl Into<String>, source: SourceError) -> Self {
        Self::Source {
            context: context.into(),
            source,
        }
    }
}
