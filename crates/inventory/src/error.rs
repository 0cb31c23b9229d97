use thiserror::Error;
use wheelsource_core::{Bucket, InsufficientStock, VendorId};

/// Errors from direct store mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no {bucket} stock for {part} from {vendor}")]
    UnknownEntry {
        bucket: Bucket,
        part: String,
        vendor: VendorId,
    },

    #[error("{bucket} stock for {part} from {vendor}: {source}")]
    Insufficient {
        bucket: Bucket,
        part: String,
        vendor: VendorId,
        #[source]
        source: InsufficientStock,
    },
}
