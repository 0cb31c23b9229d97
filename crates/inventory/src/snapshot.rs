//! Flat, persistable view of an [`InventoryStore`].

use serde::{Deserialize, Serialize};
use wheelsource_core::{Bucket, Cost, VendorId};
use wheelsource_vendor::VendorCatalog;

use crate::store::InventoryStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorAvailability {
    pub vendor: VendorId,
    pub quantity: u32,
    pub cost: Cost,
    /// Days to ship.
    pub handling_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub sku: String,
    pub bucket: Bucket,
    pub availability: Vec<VendorAvailability>,
}

impl InventoryStore {
    /// One entry per stored part, Core bucket first, parts sorted, vendors in
    /// fold order. Handling times come from each vendor's table, or the
    /// defaults for vendors without a config.
    pub fn convert_to_entries(&self, catalog: &VendorCatalog) -> Vec<InventoryEntry> {
        Bucket::ALL
            .into_iter()
            .flat_map(|bucket| {
                self.parts(bucket).map(move |(part, vendors)| {
                    let sku = part.as_str();
                    let availability = vendors
                        .iter()
                        .map(|stock| VendorAvailability {
                            vendor: stock.vendor.clone(),
                            quantity: stock.record.quantity(),
                            cost: stock.record.cost(),
                            handling_time: catalog.handling_days(&stock.vendor, sku, bucket),
                        })
                        .collect();
                    InventoryEntry {
                        sku: sku.to_string(),
                        bucket,
                        availability,
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelsource_core::{PartNumber, StockRecord};
    use wheelsource_vendor::VendorFeedConfig;

    fn catalog() -> VendorCatalog {
        let coast = VendorFeedConfig::from_json(
            r#"{
                "vendor_name": "Coast",
                "inventory_file": { "file_path": "/c.csv", "part_number_column": 0, "quantity_column": 1, "cost_column": 2 },
                "handling_time": {
                    "core": { "default": 5, "paint_codes": { "12": 8 } },
                    "finish": { "default": 2 }
                }
            }"#,
        )
        .unwrap();
        VendorCatalog::new(vec![coast]).unwrap()
    }

    #[test]
    fn entries_carry_resolved_handling_times() {
        let mut store = InventoryStore::new();
        let coast = VendorId::new("Coast").unwrap();
        let finish = PartNumber::parse("ALY12345A12").unwrap();
        let core = PartNumber::parse("ALY12345A").unwrap();
        store.insert(Bucket::Finish, &finish, &VendorId::in_house(), StockRecord::new(1, Cost::Free).unwrap());
        store.insert(Bucket::Finish, &finish, &coast, StockRecord::new(3, Cost::Known(40.0)).unwrap());
        store.insert(Bucket::Core, &core, &coast, StockRecord::new(6, Cost::Known(20.0)).unwrap());
        store.insert(Bucket::Core, &core, &VendorId::in_house(), StockRecord::new(2, Cost::Free).unwrap());

        let entries = store.convert_to_entries(&catalog());
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].sku, "ALY12345A");
        assert_eq!(entries[0].bucket, Bucket::Core);
        assert_eq!(entries[0].availability[0].handling_time, 5);
        assert_eq!(entries[0].availability[1].vendor, VendorId::in_house());
        assert_eq!(entries[0].availability[1].handling_time, 3);

        assert_eq!(entries[1].bucket, Bucket::Finish);
        assert_eq!(entries[1].availability[0].handling_time, 1);
        assert_eq!(entries[1].availability[1].handling_time, 2);
        assert_eq!(entries[1].availability[1].quantity, 3);
    }

    #[test]
    fn entries_serialize_to_json() {
        let entry = InventoryEntry {
            sku: "ALY12345A12".to_string(),
            bucket: Bucket::Finish,
            availability: vec![VendorAvailability {
                vendor: VendorId::in_house(),
                quantity: 2,
                cost: Cost::Free,
                handling_time: 1,
            }],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["bucket"], "Finish");
        assert_eq!(json["availability"][0]["vendor"], "Warehouse");
        let back: InventoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
