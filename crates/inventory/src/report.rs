//! Per-source ingestion counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wheelsource_core::VendorId;

use crate::normalizer::{RowOutcome, SkipReason};

/// Kept/skipped counts for one source (the on-hand report or one vendor feed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub rows: usize,
    pub kept: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl SourceReport {
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Kept(_) => self.kept += 1,
            RowOutcome::Skipped(reason) => *self.skipped.entry(*reason).or_default() += 1,
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

/// Outcome of one store build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub on_hand: SourceReport,
    /// In fold order.
    pub vendors: Vec<(VendorId, SourceReport)>,
}

impl IngestionReport {
    pub fn vendor(&self, vendor: &VendorId) -> Option<&SourceReport> {
        self.vendors
            .iter()
            .find(|(id, _)| id == vendor)
            .map(|(_, report)| report)
    }

    pub fn total_kept(&self) -> usize {
        self.on_hand.kept + self.vendors.iter().map(|(_, r)| r.kept).sum::<usize>()
    }

    pub fn total_skipped(&self) -> usize {
        self.on_hand.skipped_total()
            + self
                .vendors
                .iter()
                .map(|(_, r)| r.skipped_total())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_reason() {
        let mut report = SourceReport::default();
        report.record(&RowOutcome::Skipped(SkipReason::BelowMargin));
        report.record(&RowOutcome::Skipped(SkipReason::BelowMargin));
        report.record(&RowOutcome::Skipped(SkipReason::UnmappedSku));
        assert_eq!(report.rows, 3);
        assert_eq!(report.kept, 0);
        assert_eq!(report.skipped_for(SkipReason::BelowMargin), 2);
        assert_eq!(report.skipped_total(), 3);
    }

    #[test]
    fn report_serializes_reasons_as_keys() {
        let mut source = SourceReport::default();
        source.record(&RowOutcome::Skipped(SkipReason::NonListable));
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["skipped"]["non_listable"], 1);
    }
}
