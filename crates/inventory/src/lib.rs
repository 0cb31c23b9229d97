//! Inventory aggregation and allocation.
//!
//! Deterministic domain logic (no IO): raw rows come in from collaborators,
//! are normalized per vendor, folded into an [`InventoryStore`], and then
//! allocated against or projected into snapshot entries.

pub mod allocation;
pub mod error;
pub mod master;
pub mod normalizer;
pub mod on_hand;
pub mod report;
pub mod snapshot;
pub mod store;

pub use allocation::{Allocation, NO_VENDOR};
pub use error::StoreError;
pub use master::{MasterAvailability, MasterRow, VendorLine};
pub use normalizer::{FeedNormalizer, NormalizationSettings, NormalizedRecord, RowOutcome, SkipReason};
pub use on_hand::{normalize_on_hand, parse_report};
pub use report::{IngestionReport, SourceReport};
pub use snapshot::{InventoryEntry, VendorAvailability};
pub use store::{InventoryStore, VendorFeed, VendorStock};
