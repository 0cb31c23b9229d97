//! Per-vendor stock record.

use core::num::NonZeroU32;

use thiserror::Error;

use crate::cost::Cost;

/// Requested more units than a record holds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("insufficient stock: requested {requested}, available {available}")]
pub struct InsufficientStock {
    pub requested: u32,
    pub available: u32,
}

/// Quantity and unit cost one vendor holds for one part.
///
/// The quantity is never zero: a record that would empty is consumed by
/// [`StockRecord::decrement`] and reported as [`Depletion::Exhausted`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StockRecord {
    quantity: NonZeroU32,
    cost: Cost,
}

/// Outcome of a successful decrement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Depletion {
    Remaining(StockRecord),
    Exhausted,
}

impl StockRecord {
    /// `None` for a zero quantity; such records do not exist.
    pub fn new(quantity: u32, cost: Cost) -> Option<Self> {
        NonZeroU32::new(quantity).map(|quantity| Self { quantity, cost })
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn can_fill(&self, quantity: u32) -> bool {
        self.quantity.get() >= quantity
    }

    /// Fold another sighting of the same part/vendor: quantities add, the
    /// newer cost replaces the old one.
    pub fn merge(self, other: StockRecord) -> StockRecord {
        StockRecord {
            quantity: self.quantity.saturating_add(other.quantity.get()),
            cost: other.cost,
        }
    }

    pub fn decrement(self, quantity: u32) -> Result<Depletion, InsufficientStock> {
        let available = self.quantity.get();
        let remaining = available.checked_sub(quantity).ok_or(InsufficientStock {
            requested: quantity,
            available,
        })?;
        Ok(match NonZeroU32::new(remaining) {
            Some(quantity) => Depletion::Remaining(StockRecord { quantity, ..self }),
            None => Depletion::Exhausted,
        })
    }
}
