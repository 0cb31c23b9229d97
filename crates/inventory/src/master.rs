//! Master availability view: what each listable finish can be sold from.
//!
//! For every listable SKU this combines finished stock with bare cores that
//! can be painted into it, and derives the quantity and handling time to list.

use serde::{Deserialize, Serialize};
use wheelsource_core::{Bucket, Cost, PartNumber, VendorId};
use wheelsource_vendor::{ListPrices, VendorCatalog};

use crate::store::InventoryStore;

/// Listing quantity never exceeds this.
pub const MAX_LISTING_QUANTITY: u32 = 3;

/// Average handling time reported when no vendor holds the SKU.
pub const DEFAULT_AVERAGE_HANDLING_DAYS: u32 = 3;

/// Averages above [`SLOW_HANDLING_THRESHOLD_DAYS`] are reported as this.
pub const SLOW_HANDLING_DAYS: u32 = 15;
pub const SLOW_HANDLING_THRESHOLD_DAYS: u32 = 10;

/// Finished stock above this count ships on the finish handling time.
const FINISHED_HANDLING_MIN_QUANTITY: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorLine {
    pub vendor: VendorId,
    pub finish_quantity: u32,
    pub core_quantity: u32,
    pub cost: Cost,
    pub handling_time: u32,
}

impl VendorLine {
    pub fn combined_quantity(&self) -> u32 {
        self.finish_quantity.saturating_add(self.core_quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    pub sku: String,
    pub list_price: Option<f64>,
    pub vendors: Vec<VendorLine>,
    pub total_quantity: u32,
    pub listing_quantity: u32,
    pub average_handling_time: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterAvailability {
    rows: Vec<MasterRow>,
}

impl MasterAvailability {
    /// Build one row per listable SKU. SKUs without a list price are reported
    /// with no vendors.
    pub fn build(
        store: &InventoryStore,
        listable: &[PartNumber],
        catalog: &VendorCatalog,
        list_prices: &ListPrices,
    ) -> Self {
        let rows = listable
            .iter()
            .map(|sku| {
                let list_price = list_prices.get(sku.as_str());
                let vendors = match list_price {
                    Some(_) => vendor_lines(store, sku, catalog),
                    None => Vec::new(),
                };
                summarize(sku, list_price, vendors)
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[MasterRow] {
        &self.rows
    }

    pub fn get(&self, sku: &str) -> Option<&MasterRow> {
        self.rows.iter().find(|row| row.sku == sku)
    }
}

fn vendor_lines(store: &InventoryStore, sku: &PartNumber, catalog: &VendorCatalog) -> Vec<VendorLine> {
    let mut lines: Vec<VendorLine> = store
        .get(Bucket::Finish, sku)
        .unwrap_or_default()
        .iter()
        .map(|stock| VendorLine {
            vendor: stock.vendor.clone(),
            finish_quantity: stock.record.quantity(),
            core_quantity: 0,
            cost: stock.record.cost(),
            handling_time: 0,
        })
        .collect();

    if sku.core_search_key().is_some() {
        for stock in store.get(Bucket::Core, sku).unwrap_or_default() {
            match lines.iter_mut().find(|line| line.vendor == stock.vendor) {
                Some(line) => {
                    line.core_quantity = line.core_quantity.saturating_add(stock.record.quantity())
                }
                None => lines.push(VendorLine {
                    vendor: stock.vendor.clone(),
                    finish_quantity: 0,
                    core_quantity: stock.record.quantity(),
                    cost: stock.record.cost(),
                    handling_time: 0,
                }),
            }
        }
    }

    for line in &mut lines {
        let bucket = if line.finish_quantity > FINISHED_HANDLING_MIN_QUANTITY {
            Bucket::Finish
        } else {
            Bucket::Core
        };
        line.handling_time = catalog.handling_days(&line.vendor, sku.as_str(), bucket);
    }
    lines
}

fn summarize(sku: &PartNumber, list_price: Option<f64>, vendors: Vec<VendorLine>) -> MasterRow {
    let total_quantity = vendors
        .iter()
        .map(VendorLine::combined_quantity)
        .fold(0u32, u32::saturating_add);
    let average_handling_time = if vendors.is_empty() {
        DEFAULT_AVERAGE_HANDLING_DAYS
    } else {
        let days = vendors
            .iter()
            .map(|line| line.handling_time)
            .fold(0u32, u32::saturating_add);
        let average = (f64::from(days) / vendors.len() as f64).round() as u32;
        if average > SLOW_HANDLING_THRESHOLD_DAYS {
            SLOW_HANDLING_DAYS
        } else {
            average
        }
    };

    MasterRow {
        sku: sku.to_string(),
        list_price,
        total_quantity,
        listing_quantity: total_quantity.min(MAX_LISTING_QUANTITY),
        average_handling_time,
        vendors,
    }
}
