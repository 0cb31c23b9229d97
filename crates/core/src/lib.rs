//! Inventory domain primitives.
//!
//! This crate contains **pure domain** primitives (no IO): part-number grammar,
//! buckets, costs and stock records shared by the vendor and inventory crates.

pub mod bucket;
pub mod cost;
pub mod error;
pub mod id;
pub mod part;
pub mod stock;

pub use bucket::Bucket;
pub use cost::Cost;
pub use error::{DomainError, DomainResult};
pub use id::{IN_HOUSE_VENDOR, RunId, VendorId};
pub use part::{Material, PartKind, PartNumber};
pub use stock::{Depletion, InsufficientStock, StockRecord};
