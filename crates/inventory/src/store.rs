//! In-memory two-tier inventory: bucket → part → vendor → stock record.

use std::collections::BTreeMap;

use tracing::{debug, info};
use wheelsource_core::{Bucket, Depletion, PartNumber, StockRecord, VendorId};
use wheelsource_vendor::{ListPrices, LookupTable, VendorFeedConfig};

use crate::error::StoreError;
use crate::normalizer::{FeedNormalizer, NormalizationSettings, NormalizedRecord, RowOutcome};
use crate::on_hand::normalize_on_hand;
use crate::report::{IngestionReport, SourceReport};

/// One vendor's holding of one part.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorStock {
    pub vendor: VendorId,
    pub record: StockRecord,
}

type PartStock = BTreeMap<PartNumber, Vec<VendorStock>>;

/// A vendor feed ready to fold: its config, raw rows and any mapping tables.
#[derive(Debug, Clone)]
pub struct VendorFeed<'a> {
    pub config: &'a VendorFeedConfig,
    pub rows: Vec<Vec<String>>,
    pub sku_map: Option<LookupTable>,
    pub cost_map: Option<LookupTable>,
}

impl<'a> VendorFeed<'a> {
    pub fn new(config: &'a VendorFeedConfig, rows: Vec<Vec<String>>) -> Self {
        Self {
            config,
            rows,
            sku_map: None,
            cost_map: None,
        }
    }

    pub fn with_sku_map(mut self, sku_map: LookupTable) -> Self {
        self.sku_map = Some(sku_map);
        self
    }

    pub fn with_cost_map(mut self, cost_map: LookupTable) -> Self {
        self.cost_map = Some(cost_map);
        self
    }
}

/// Everything known about stock for one run.
///
/// Vendors under a part keep the order they were first folded in (in-house
/// first, then vendors in feed order); allocation breaks cost ties by that
/// order. A part with no vendors and a vendor with no units are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryStore {
    core: PartStock,
    finish: PartStock,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the in-house on-hand report, then every vendor feed in order.
    pub fn build(
        on_hand: &[Vec<String>],
        feeds: &[VendorFeed<'_>],
        settings: &NormalizationSettings,
        list_prices: &ListPrices,
    ) -> (Self, IngestionReport) {
        let mut store = Self::new();
        let mut report = IngestionReport::default();

        let in_house = VendorId::in_house();
        for row in on_hand {
            let outcome = normalize_on_hand(row);
            report.on_hand.record(&outcome);
            if let RowOutcome::Kept(record) = outcome {
                store.insert_record(&in_house, record);
            }
        }
        info!(
            kept = report.on_hand.kept,
            skipped = report.on_hand.skipped_total(),
            "folded in-house on-hand report"
        );

        for feed in feeds {
            let source = store.fold_feed(feed, settings, list_prices);
            report.vendors.push((feed.config.vendor().clone(), source));
        }

        (store, report)
    }

    fn fold_feed(
        &mut self,
        feed: &VendorFeed<'_>,
        settings: &NormalizationSettings,
        list_prices: &ListPrices,
    ) -> SourceReport {
        let vendor = feed.config.vendor();
        let normalizer = FeedNormalizer::new(feed.config, settings, list_prices)
            .with_sku_map(feed.sku_map.as_ref())
            .with_cost_map(feed.cost_map.as_ref());

        let mut source = SourceReport::default();
        for row in &feed.rows {
            let outcome = normalizer.normalize(row);
            source.record(&outcome);
            match outcome {
                RowOutcome::Kept(record) => self.insert_record(vendor, record),
                RowOutcome::Skipped(reason) => {
                    debug!(vendor = %vendor, %reason, row = ?row, "skipping feed row");
                }
            }
        }
        info!(
            vendor = %vendor,
            rows = source.rows,
            kept = source.kept,
            skipped = source.skipped_total(),
            "folded vendor feed"
        );
        source
    }

    fn insert_record(&mut self, vendor: &VendorId, record: NormalizedRecord) {
        if let Some(stock) = StockRecord::new(record.quantity, record.cost) {
            self.insert(record.bucket, &record.part_number, vendor, stock);
        }
    }

    fn key(bucket: Bucket, part: &PartNumber) -> PartNumber {
        match bucket {
            Bucket::Core => part.to_core(),
            Bucket::Finish => part.clone(),
        }
    }

    fn bucket(&self, bucket: Bucket) -> &PartStock {
        match bucket {
            Bucket::Core => &self.core,
            Bucket::Finish => &self.finish,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut PartStock {
        match bucket {
            Bucket::Core => &mut self.core,
            Bucket::Finish => &mut self.finish,
        }
    }

    /// Add stock. Core keys are truncated to the core identity; a repeated
    /// part/vendor pair sums quantities and takes the newer cost.
    pub fn insert(&mut self, bucket: Bucket, part: &PartNumber, vendor: &VendorId, record: StockRecord) {
        let vendors = self.bucket_mut(bucket).entry(Self::key(bucket, part)).or_default();
        match vendors.iter_mut().find(|v| &v.vendor == vendor) {
            Some(existing) => existing.record = existing.record.merge(record),
            None => vendors.push(VendorStock {
                vendor: vendor.clone(),
                record,
            }),
        }
    }

    /// Every vendor holding `part` in `bucket`, in fold order.
    pub fn get(&self, bucket: Bucket, part: &PartNumber) -> Option<&[VendorStock]> {
        self.bucket(bucket)
            .get(&Self::key(bucket, part))
            .map(Vec::as_slice)
    }

    pub fn record(&self, bucket: Bucket, part: &PartNumber, vendor: &VendorId) -> Option<StockRecord> {
        self.get(bucket, part)?
            .iter()
            .find(|v| &v.vendor == vendor)
            .map(|v| v.record)
    }

    /// Remove `quantity` units. The vendor entry goes away when it reaches
    /// zero, and the part entry when no vendor remains.
    pub fn decrement(
        &mut self,
        bucket: Bucket,
        part: &PartNumber,
        vendor: &VendorId,
        quantity: u32,
    ) -> Result<(), StoreError> {
        let key = Self::key(bucket, part);
        let unknown = || StoreError::UnknownEntry {
            bucket,
            part: key.to_string(),
            vendor: vendor.clone(),
        };

        let parts = self.bucket_mut(bucket);
        let vendors = parts.get_mut(&key).ok_or_else(unknown)?;
        let index = vendors
            .iter()
            .position(|v| &v.vendor == vendor)
            .ok_or_else(unknown)?;

        let depletion = vendors[index]
            .record
            .decrement(quantity)
            .map_err(|source| StoreError::Insufficient {
                bucket,
                part: key.to_string(),
                vendor: vendor.clone(),
                source,
            })?;

        match depletion {
            Depletion::Remaining(record) => vendors[index].record = record,
            Depletion::Exhausted => {
                vendors.remove(index);
                if vendors.is_empty() {
                    parts.remove(&key);
                }
            }
        }
        Ok(())
    }

    /// Parts in `bucket`, sorted by part number.
    pub fn parts(&self, bucket: Bucket) -> impl Iterator<Item = (&PartNumber, &[VendorStock])> {
        self.bucket(bucket)
            .iter()
            .map(|(part, vendors)| (part, vendors.as_slice()))
    }

    pub fn len(&self, bucket: Bucket) -> usize {
        self.bucket(bucket).len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty() && self.finish.is_empty()
    }
}
