//! Infrastructure layer: collaborator seams, local and in-memory adapters,
//! settings, and run orchestration.

pub mod error;
pub mod local;
pub mod memory;
pub mod run;
pub mod settings;
pub mod sink;
pub mod source;

pub use error::{RunError, SinkError, SourceError};
pub use local::{LocalFileSource, LocalOnHandFile};
pub use memory::{InMemoryFileStore, InMemoryOnHand, InMemorySnapshotSink};
pub use run::{InventoryRun, PreparedRun};
pub use settings::RunSettings;
pub use sink::{JsonFileSink, SnapshotSink};
pub use source::{FeedSource, OnHandSource};
