//! Raw vendor row → normalized stock record.

use serde::{Deserialize, Serialize};
use wheelsource_core::{Bucket, Cost, DomainError, DomainResult, PartKind, PartNumber};
use wheelsource_vendor::{CostSource, ListPrices, LookupTable, VendorFeedConfig};

/// Tunables shared by every vendor feed in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationSettings {
    pub core_min_quantity: u32,
    pub finish_min_quantity: u32,
    pub replica_min_quantity: u32,
    /// A row is dropped when `cost * minimum_margin` exceeds the list price.
    pub minimum_margin: f64,
    /// Paint codes at or above this value are never listed.
    pub non_listable_paint_code: u8,
    pub excluded_paint_codes: Vec<u8>,
    /// Drop rows whose part has no list price instead of skipping the margin check.
    pub require_list_price: bool,
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        Self {
            core_min_quantity: 1,
            finish_min_quantity: 1,
            replica_min_quantity: 1,
            minimum_margin: 1.40,
            non_listable_paint_code: 90,
            excluded_paint_codes: vec![85, 86],
            require_list_price: false,
        }
    }
}

impl NormalizationSettings {
    pub fn with_min_quantities(mut self, core: u32, finish: u32, replica: u32) -> Self {
        self.core_min_quantity = core;
        self.finish_min_quantity = finish;
        self.replica_min_quantity = replica;
        self
    }

    pub fn with_minimum_margin(mut self, minimum_margin: f64) -> Self {
        self.minimum_margin = minimum_margin;
        self
    }

    pub fn with_excluded_paint_codes(mut self, codes: impl Into<Vec<u8>>) -> Self {
        self.excluded_paint_codes = codes.into();
        self
    }

    pub fn with_require_list_price(mut self, require: bool) -> Self {
        self.require_list_price = require;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !self.minimum_margin.is_finite() || self.minimum_margin <= 0.0 {
            return Err(DomainError::validation(format!(
                "minimum_margin must be a positive number, got {}",
                self.minimum_margin
            )));
        }
        Ok(())
    }

    pub fn is_listable(&self, part: &PartNumber) -> bool {
        match part.paint_code() {
            Some(code) => {
                code < self.non_listable_paint_code && !self.excluded_paint_codes.contains(&code)
            }
            None => true,
        }
    }

    /// A vendor's classification rule picks the bucket minimum outright; the
    /// replica minimum only applies when the grammar decided.
    fn min_quantity(&self, kind: PartKind, classified: Classified) -> u32 {
        match (classified.bucket, kind, classified.overridden) {
            (Bucket::Core, _, _) => self.core_min_quantity,
            (Bucket::Finish, PartKind::Replica, false) => self.replica_min_quantity,
            (Bucket::Finish, _, _) => self.finish_min_quantity,
        }
    }
}

/// Bucket for a row, and whether the vendor's classification rule chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Classified {
    bucket: Bucket,
    overridden: bool,
}

/// One vendor row after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub part_number: PartNumber,
    pub bucket: Bucket,
    pub quantity: u32,
    pub cost: Cost,
}

/// Why a row was discarded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The vendor code is not in the vendor's SKU map.
    UnmappedSku,
    /// The part number matches none of the grammars.
    InvalidPartNumber,
    /// The part number is not in the vendor's cost map.
    MissingCost,
    /// The cost cell is not a finite, non-negative number.
    InvalidCost,
    /// Cost times the minimum margin exceeds the list price.
    BelowMargin,
    /// No list price is known and one is required.
    MissingListPrice,
    /// The paint code is never listed.
    NonListable,
    /// The vendor's own inclusion rule rejected the row.
    VendorExcluded,
    /// The quantity cell is not a number.
    InvalidQuantity,
    /// Fewer units than the minimum for the part kind.
    BelowMinimumQuantity,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::UnmappedSku => "unmapped_sku",
            SkipReason::InvalidPartNumber => "invalid_part_number",
            SkipReason::MissingCost => "missing_cost",
            SkipReason::InvalidCost => "invalid_cost",
            SkipReason::BelowMargin => "below_margin",
            SkipReason::MissingListPrice => "missing_list_price",
            SkipReason::NonListable => "non_listable",
            SkipReason::VendorExcluded => "vendor_excluded",
            SkipReason::InvalidQuantity => "invalid_quantity",
            SkipReason::BelowMinimumQuantity => "below_minimum_quantity",
        }
    }
}

impl core::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of normalizing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Kept(NormalizedRecord),
    Skipped(SkipReason),
}

pub(crate) fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(|v| v.trim()).unwrap_or("")
}

/// Parse a numeric cell, tolerating currency symbols and thousands separators.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole units from a quantity cell; negative stock counts as none.
pub(crate) fn parse_quantity(raw: &str) -> Option<u32> {
    let value = parse_number(raw)?;
    if value <= 0.0 {
        return Some(0);
    }
    Some(value.floor().min(f64::from(u32::MAX)) as u32)
}

/// Applies one vendor's [`VendorFeedConfig`] to its raw rows.
///
/// Steps run in a fixed order: part-number resolution, bucket classification,
/// cost resolution, cost adjustment, inclusion filtering, minimum quantity. The
/// first step that fails decides the [`SkipReason`].
#[derive(Debug, Clone, Copy)]
pub struct FeedNormalizer<'a> {
    config: &'a VendorFeedConfig,
    settings: &'a NormalizationSettings,
    list_prices: &'a ListPrices,
    sku_map: Option<&'a LookupTable>,
    cost_map: Option<&'a LookupTable>,
}

impl<'a> FeedNormalizer<'a> {
    pub fn new(
        config: &'a VendorFeedConfig,
        settings: &'a NormalizationSettings,
        list_prices: &'a ListPrices,
    ) -> Self {
        Self {
            config,
            settings,
            list_prices,
            sku_map: None,
            cost_map: None,
        }
    }

    pub fn with_sku_map(mut self, sku_map: Option<&'a LookupTable>) -> Self {
        self.sku_map = sku_map;
        self
    }

    pub fn with_cost_map(mut self, cost_map: Option<&'a LookupTable>) -> Self {
        self.cost_map = cost_map;
        self
    }

    pub fn normalize(&self, row: &[String]) -> RowOutcome {
        match self.try_normalize(row) {
            Ok(record) => RowOutcome::Kept(record),
            Err(reason) => RowOutcome::Skipped(reason),
        }
    }

    fn try_normalize(&self, row: &[String]) -> Result<NormalizedRecord, SkipReason> {
        let feed = self.config.feed();
        let part = self.resolve_part(cell(row, feed.part_number_column))?;
        let classified = self.classify(row, &part);
        let bucket = classified.bucket;

        let cost = self.resolve_cost(row, &part)?;
        let cost = self.config.cost_adjustment().apply(&part, cost);
        self.check_inclusion(row, &part, bucket, cost)?;

        let quantity = parse_quantity(cell(row, feed.quantity_column))
            .ok_or(SkipReason::InvalidQuantity)?
            .saturating_sub(feed.quantity_deduction);
        let minimum = self.settings.min_quantity(part.kind(), classified);
        if quantity == 0 || quantity < minimum {
            return Err(SkipReason::BelowMinimumQuantity);
        }

        Ok(NormalizedRecord {
            part_number: part,
            bucket,
            quantity,
            cost,
        })
    }

    fn resolve_part(&self, raw: &str) -> Result<PartNumber, SkipReason> {
        match self.sku_map {
            Some(map) => {
                let mapped = map.get(raw).ok_or(SkipReason::UnmappedSku)?;
                PartNumber::parse(mapped).map_err(|_| SkipReason::InvalidPartNumber)
            }
            None => PartNumber::parse_vendor_code(raw).map_err(|_| SkipReason::InvalidPartNumber),
        }
    }

    fn classify(&self, row: &[String], part: &PartNumber) -> Classified {
        if let Some(bucket) = self.config.classification().and_then(|rule| rule.classify(row)) {
            return Classified {
                bucket,
                overridden: true,
            };
        }
        let bucket = match part.kind() {
            PartKind::Core => Bucket::Core,
            PartKind::Finish | PartKind::Replica => Bucket::Finish,
        };
        Classified {
            bucket,
            overridden: false,
        }
    }

    fn resolve_cost(&self, row: &[String], part: &PartNumber) -> Result<Cost, SkipReason> {
        let raw = match self.config.cost_source() {
            CostSource::Column(column) => cell(row, *column),
            CostSource::Lookup(_) => self
                .cost_map
                .and_then(|map| map.get(part.as_str()))
                .ok_or(SkipReason::MissingCost)?,
        };
        let amount = parse_number(raw).ok_or(SkipReason::InvalidCost)?;
        if amount < 0.0 {
            return Err(SkipReason::InvalidCost);
        }
        Ok(Cost::from_feed(amount))
    }

    fn check_inclusion(
        &self,
        row: &[String],
        part: &PartNumber,
        bucket: Bucket,
        cost: Cost,
    ) -> Result<(), SkipReason> {
        if let Cost::Known(amount) = cost {
            if !amount.is_finite() || amount < 0.0 {
                return Err(SkipReason::InvalidCost);
            }
        }

        // Priced by the resolved part; Core rows fall back to their core key.
        let price = self.list_prices.get(part.as_str()).or_else(|| match bucket {
            Bucket::Core => self.list_prices.get(part.core_key()),
            Bucket::Finish => None,
        });
        match price {
            Some(price) => {
                if let Cost::Known(amount) = cost {
                    if amount * self.settings.minimum_margin > price {
                        return Err(SkipReason::BelowMargin);
                    }
                }
            }
            None if self.settings.require_list_price => return Err(SkipReason::MissingListPrice),
            None => {}
        }

        if !self.settings.is_listable(part) {
            return Err(SkipReason::NonListable);
        }
        if !self.config.inclusion().is_none_or(|rule| rule.admits(row)) {
            return Err(SkipReason::VendorExcluded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn config(json: &str) -> VendorFeedConfig {
        VendorFeedConfig::from_json(json).unwrap()
    }

    fn inline_vendor() -> VendorFeedConfig {
        config(
            r#"{
                "vendor_name": "VendorX",
                "inventory_file": { "file_path": "/x.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 }
            }"#,
        )
    }

    fn kept(outcome: RowOutcome) -> NormalizedRecord {
        match outcome {
            RowOutcome::Kept(record) => record,
            RowOutcome::Skipped(reason) => panic!("row skipped: {reason}"),
        }
    }

    #[test]
    fn finish_grammar_defaults_to_finish_bucket() {
        let vendor = inline_vendor();
        let settings = NormalizationSettings::default();
        let prices = ListPrices::default();
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        let record = kept(normalizer.normalize(&row(&["aly12345a12", "4", "55.5"])));
        assert_eq!(record.part_number.as_str(), "ALY12345A12");
        assert_eq!(record.bucket, Bucket::Finish);
        assert_eq!(record.quantity, 4);
        assert_eq!(record.cost, Cost::Known(55.5));

        let core = kept(normalizer.normalize(&row(&["ALY12345A", "2", "30"])));
        assert_eq!(core.bucket, Bucket::Core);

        let replica = kept(normalizer.normalize(&row(&["ALY12345A12N", "2", "30"])));
        assert_eq!(replica.bucket, Bucket::Finish);
    }

    #[test]
    fn road_ready_codes_are_repaired_without_sku_map() {
        let vendor = inline_vendor();
        let settings = NormalizationSettings::default();
        let prices = ListPrices::default();
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        let record = kept(normalizer.normalize(&row(&["ALY012345A12", "1", "10"])));
        assert_eq!(record.part_number.as_str(), "ALY12345A12");
        assert_eq!(
            normalizer.normalize(&row(&["WHEEL-1", "1", "10"])),
            RowOutcome::Skipped(SkipReason::InvalidPartNumber)
        );
    }

    #[test]
    fn sku_map_miss_is_skipped() {
        let vendor = inline_vendor();
        let settings = NormalizationSettings::default();
        let prices = ListPrices::default();
        let map = LookupTable::from_rows(&[row(&["v-100", "ALY12345A12"])], 0, 1);
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices).with_sku_map(Some(&map));

        let record = kept(normalizer.normalize(&row(&["V-100", "3", "20"])));
        assert_eq!(record.part_number.as_str(), "ALY12345A12");
        assert_eq!(
            normalizer.normalize(&row(&["V-200", "3", "20"])),
            RowOutcome::Skipped(SkipReason::UnmappedSku)
        );
    }

    #[test]
    fn classification_rule_overrides_grammar() {
        let vendor = config(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 },
                "classification": { "column": 3, "core_condition": "condition == 'C'", "finish_condition": "condition == 'F'" }
            }"#,
        );
        let settings = NormalizationSettings::default();
        let prices = ListPrices::default();
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        let core = kept(normalizer.normalize(&row(&["ALY12345A12", "5", "20", "C"])));
        assert_eq!(core.bucket, Bucket::Core);
        let unclassified = kept(normalizer.normalize(&row(&["ALY12345A12", "5", "20", "?"])));
        assert_eq!(unclassified.bucket, Bucket::Finish);
    }

    #[test]
    fn reclassified_core_rows_are_margin_checked_by_their_own_price() {
        let vendor = config(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 },
                "classification": { "column": 3, "core_condition": "condition == 'C'" }
            }"#,
        );
        let settings = NormalizationSettings::default();
        let mut prices = ListPrices::default();
        prices.insert("ALY12345A12", 80.0);
        prices.insert("ALY54321B", 100.0);
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        // 70 * 1.4 = 98 > 80.
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12", "5", "70", "C"])),
            RowOutcome::Skipped(SkipReason::BelowMargin)
        );
        let fits = kept(normalizer.normalize(&row(&["ALY12345A12", "5", "50", "C"])));
        assert_eq!((fits.bucket, fits.cost), (Bucket::Core, Cost::Known(50.0)));

        // No finish price: the core key's price applies.
        assert_eq!(
            normalizer.normalize(&row(&["ALY54321B07", "5", "80", "C"])),
            RowOutcome::Skipped(SkipReason::BelowMargin)
        );
    }

    #[test]
    fn classified_replicas_use_the_bucket_minimum() {
        let vendor = config(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 },
                "classification": { "column": 3, "core_condition": "condition == 'C'", "finish_condition": "condition == 'F'" }
            }"#,
        );
        let settings = NormalizationSettings::default().with_min_quantities(1, 2, 4);
        let prices = ListPrices::default();
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        let classified = kept(normalizer.normalize(&row(&["ALY12345A12N", "2", "10", "F"])));
        assert_eq!((classified.bucket, classified.quantity), (Bucket::Finish, 2));
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12N", "2", "10", "?"])),
            RowOutcome::Skipped(SkipReason::BelowMinimumQuantity)
        );
    }

    #[test]
    fn adjustment_down_to_zero_leaves_cost_unknown() {
        let vendor = config(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 },
                "cost_adjustment": { "general": -10.0 }
            }"#,
        );
        let settings = NormalizationSettings::default();
        let prices = ListPrices::default();
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        assert_eq!(kept(normalizer.normalize(&row(&["ALY12345A12", "1", "10"]))).cost, Cost::Unknown);
        assert_eq!(
            kept(normalizer.normalize(&row(&["ALY12345A12", "1", "25"]))).cost,
            Cost::Known(15.0)
        );
    }

    #[test]
    fn cost_map_miss_is_distinct_from_zero() {
        let vendor = config(
            r#"{
                "vendor_name": "Valley",
                "inventory_file": { "file_path": "/v.csv", "part_number_column": 0, "quantity_column": 1 },
                "cost_map": { "file_path": "/v-costs.csv" }
            }"#,
        );
        let settings = NormalizationSettings::default();
        let prices = ListPrices::default();
        let costs = LookupTable::from_rows(
            &[row(&["ALY12345A12", "0"]), row(&["ALY12345A13", "12.5"])],
            0,
            1,
        );
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices).with_cost_map(Some(&costs));

        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A14", "2"])),
            RowOutcome::Skipped(SkipReason::MissingCost)
        );
        assert_eq!(kept(normalizer.normalize(&row(&["ALY12345A12", "2"]))).cost, Cost::Unknown);
        assert_eq!(
            kept(normalizer.normalize(&row(&["ALY12345A13", "2"]))).cost,
            Cost::Known(12.5)
        );
    }

    #[test]
    fn adjustment_runs_before_margin_check() {
        let vendor = config(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 },
                "cost_adjustment": { "alloy": 10.0 }
            }"#,
        );
        let settings = NormalizationSettings::default();
        let mut prices = ListPrices::default();
        prices.insert("ALY12345A12", 80.0);
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        // (40 + 10) * 1.4 = 70 fits under 80.
        assert_eq!(
            kept(normalizer.normalize(&row(&["ALY12345A12", "1", "40"]))).cost,
            Cost::Known(50.0)
        );
        // (50 + 10) * 1.4 = 84 > 80.
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12", "1", "50"])),
            RowOutcome::Skipped(SkipReason::BelowMargin)
        );
    }

    #[test]
    fn inclusion_filters_apply_in_order() {
        let vendor = config(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 },
                "inclusion": { "column": 3, "exclusion_condition": "condition == 'DISC'" }
            }"#,
        );
        let settings = NormalizationSettings::default();
        let prices = ListPrices::default();
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12", "1", "n/a", ""])),
            RowOutcome::Skipped(SkipReason::InvalidCost)
        );
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A95", "1", "10", ""])),
            RowOutcome::Skipped(SkipReason::NonListable)
        );
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A85", "1", "10", ""])),
            RowOutcome::Skipped(SkipReason::NonListable)
        );
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12", "1", "10", "DISC"])),
            RowOutcome::Skipped(SkipReason::VendorExcluded)
        );
    }

    #[test]
    fn missing_list_price_only_matters_when_required() {
        let vendor = inline_vendor();
        let prices = ListPrices::default();
        let lenient = NormalizationSettings::default();
        let strict = NormalizationSettings::default().with_require_list_price(true);

        let r = row(&["ALY12345A12", "1", "10"]);
        assert!(matches!(
            FeedNormalizer::new(&vendor, &lenient, &prices).normalize(&r),
            RowOutcome::Kept(_)
        ));
        assert_eq!(
            FeedNormalizer::new(&vendor, &strict, &prices).normalize(&r),
            RowOutcome::Skipped(SkipReason::MissingListPrice)
        );
    }

    #[test]
    fn quantity_deduction_and_minimums() {
        let vendor = config(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2, "quantity_deduction": 2 }
            }"#,
        );
        let settings = NormalizationSettings::default().with_min_quantities(1, 2, 4);
        let prices = ListPrices::default();
        let normalizer = FeedNormalizer::new(&vendor, &settings, &prices);

        assert_eq!(kept(normalizer.normalize(&row(&["ALY12345A12", "5", "10"]))).quantity, 3);
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12", "3", "10"])),
            RowOutcome::Skipped(SkipReason::BelowMinimumQuantity)
        );
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12N", "5", "10"])),
            RowOutcome::Skipped(SkipReason::BelowMinimumQuantity)
        );
        assert_eq!(
            normalizer.normalize(&row(&["ALY12345A12", "lots", "10"])),
            RowOutcome::Skipped(SkipReason::InvalidQuantity)
        );
    }

    #[test]
    fn settings_reject_non_positive_margin() {
        assert!(NormalizationSettings::default().validate().is_ok());
        assert!(NormalizationSettings::default().with_minimum_margin(0.0).validate().is_err());
        assert!(
            NormalizationSettings::default()
                .with_minimum_margin(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn numbers_tolerate_currency_formatting() {
        assert_eq!(parse_number(" $1,250.50 "), Some(1250.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_quantity("7.9"), Some(7));
        assert_eq!(parse_quantity("-3"), Some(0));
    }
}
