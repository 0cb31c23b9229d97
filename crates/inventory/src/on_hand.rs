//! In-house on-hand report from the ERP.
//!
//! The report is quoted CSV with a header line and three columns:
//! `part number, quantity, average cost`. The average cost is ignored; in-house
//! stock is always [`Cost::Free`].

use tracing::debug;
use wheelsource_core::{Bucket, Cost, PartKind, PartNumber};

use crate::normalizer::{NormalizedRecord, RowOutcome, SkipReason, cell, parse_quantity};

const PART_NUMBER_COLUMN: usize = 0;
const QUANTITY_COLUMN: usize = 1;

/// Split the raw report into rows, dropping the header. Unreadable lines are
/// skipped rather than failing the report.
pub fn parse_report(text: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record.iter().map(str::to_string).collect()),
            Err(error) => {
                debug!(%error, "skipping unreadable on-hand line");
                None
            }
        })
        .collect()
}

/// Normalize one on-hand row.
///
/// Finish and replica grammar go to the Finish bucket, core grammar and the
/// `*CORE` suffix form go to the Core bucket.
pub fn normalize_on_hand(row: &[String]) -> RowOutcome {
    let raw = cell(row, PART_NUMBER_COLUMN);
    let (part_number, bucket) = match PartNumber::parse_in_house_core(raw) {
        Some(core) => (core, Bucket::Core),
        None => match PartNumber::parse(raw) {
            Ok(part) => {
                let bucket = match part.kind() {
                    PartKind::Core => Bucket::Core,
                    PartKind::Finish | PartKind::Replica => Bucket::Finish,
                };
                (part, bucket)
            }
            Err(_) => return RowOutcome::Skipped(SkipReason::InvalidPartNumber),
        },
    };

    let Some(quantity) = parse_quantity(cell(row, QUANTITY_COLUMN)) else {
        return RowOutcome::Skipped(SkipReason::InvalidQuantity);
    };
    if quantity == 0 {
        return RowOutcome::Skipped(SkipReason::BelowMinimumQuantity);
    }

    RowOutcome::Kept(NormalizedRecord {
        part_number,
        bucket,
        quantity,
        cost: Cost::Free,
    })
}
