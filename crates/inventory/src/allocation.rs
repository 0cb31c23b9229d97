//! Cheapest-vendor allocation over an [`InventoryStore`].

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;
use wheelsource_core::{Bucket, Cost, DomainError, DomainResult, PartNumber, VendorId};

use crate::store::InventoryStore;

/// Vendor label reported when nobody can fill a request.
pub const NO_VENDOR: &str = "No Vendor";

/// Who fills a request, at what unit cost, from which bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Allocation {
    Sourced {
        vendor: VendorId,
        cost: Cost,
        bucket: Bucket,
    },
    NoVendor,
}

impl Allocation {
    pub fn is_sourced(&self) -> bool {
        matches!(self, Allocation::Sourced { .. })
    }

    pub fn vendor_name(&self) -> &str {
        match self {
            Allocation::Sourced { vendor, .. } => vendor.as_str(),
            Allocation::NoVendor => NO_VENDOR,
        }
    }

    /// Unit cost as a plain amount; free, unresolved and unsourced all report `0.0`.
    pub fn unit_cost(&self) -> f64 {
        match self {
            Allocation::Sourced { cost, .. } => cost.amount(),
            Allocation::NoVendor => 0.0,
        }
    }

    /// `"Core"`, `"Finish"`, or `""` when unsourced.
    pub fn bucket_label(&self) -> &'static str {
        match self {
            Allocation::Sourced { bucket, .. } => bucket.as_str(),
            Allocation::NoVendor => "",
        }
    }
}

impl InventoryStore {
    /// Reserve `quantity` units of `part` from the cheapest vendor that can
    /// fill the whole request.
    ///
    /// In-house core stock is used first when the part can be built from a
    /// bare core. Otherwise the Finish bucket is searched for the exact part,
    /// then the Core bucket for its core. The winner's stock is decremented,
    /// so repeated calls deplete the store. Returns [`Allocation::NoVendor`]
    /// without touching the store when nothing qualifies.
    pub fn get_cheapest_vendor(&mut self, part: &PartNumber, quantity: u32) -> DomainResult<Allocation> {
        if quantity == 0 {
            return Err(DomainError::validation("requested quantity must be positive"));
        }

        if let Some(allocation) = self.take_in_house_core(part, quantity)? {
            return Ok(allocation);
        }

        for bucket in [Bucket::Finish, Bucket::Core] {
            if bucket == Bucket::Core && part.core_search_key().is_none() {
                continue;
            }
            let Some((vendor, cost)) = self.cheapest_in(bucket, part, quantity) else {
                continue;
            };
            self.decrement(bucket, part, &vendor, quantity)
                .map_err(|e| DomainError::invariant(e.to_string()))?;
            info!(part = %part, quantity, vendor = %vendor, cost = %cost, bucket = %bucket, "allocated");
            return Ok(Allocation::Sourced { vendor, cost, bucket });
        }

        info!(part = %part, quantity, "no vendor can fill request");
        Ok(Allocation::NoVendor)
    }

    fn take_in_house_core(&mut self, part: &PartNumber, quantity: u32) -> DomainResult<Option<Allocation>> {
        if part.core_search_key().is_none() {
            return Ok(None);
        }
        let in_house = VendorId::in_house();
        let available = self
            .record(Bucket::Core, part, &in_house)
            .is_some_and(|record| record.can_fill(quantity));
        if !available {
            return Ok(None);
        }

        self.decrement(Bucket::Core, part, &in_house, quantity)
            .map_err(|e| DomainError::invariant(e.to_string()))?;
        info!(part = %part, quantity, "allocated from in-house core");
        Ok(Some(Allocation::Sourced {
            vendor: in_house,
            cost: Cost::Free,
            bucket: Bucket::Core,
        }))
    }

    /// Cheapest vendor in `bucket` holding at least `quantity`; ties keep the
    /// earlier vendor.
    fn cheapest_in(&self, bucket: Bucket, part: &PartNumber, quantity: u32) -> Option<(VendorId, Cost)> {
        let mut best: Option<(VendorId, Cost)> = None;
        for stock in self.get(bucket, part)? {
            if !stock.record.can_fill(quantity) {
                continue;
            }
            let cost = self.effective_cost(part, &stock.vendor, stock.record.cost());
            let better = match &best {
                Some((_, current)) => cost.allocation_cmp(current) == Ordering::Less,
                None => true,
            };
            if better {
                best = Some((stock.vendor.clone(), cost));
            }
        }
        best
    }

    /// An unresolved cost borrows the vendor's Finish-bucket cost for the same part.
    fn effective_cost(&self, part: &PartNumber, vendor: &VendorId, cost: Cost) -> Cost {
        if !cost.is_unknown() {
            return cost;
        }
        self.record(Bucket::Finish, part, vendor)
            .map(|record| record.cost())
            .unwrap_or(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelsource_core::StockRecord;

    fn part(raw: &str) -> PartNumber {
        PartNumber::parse(raw).unwrap()
    }

    fn vendor(name: &str) -> VendorId {
        VendorId::new(name).unwrap()
    }

    fn put(store: &mut InventoryStore, bucket: Bucket, raw: &str, who: &VendorId, quantity: u32, cost: Cost) {
        store.insert(bucket, &part(raw), who, StockRecord::new(quantity, cost).unwrap());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut store = InventoryStore::new();
        assert!(store.get_cheapest_vendor(&part("ALY12345A12"), 0).is_err());
    }

    #[test]
    fn sentinel_accessors() {
        let none = Allocation::NoVendor;
        assert_eq!(none.vendor_name(), "No Vendor");
        assert_eq!(none.unit_cost(), 0.0);
        assert_eq!(none.bucket_label(), "");
        assert!(!none.is_sourced());
    }

    #[test]
    fn cheapest_vendor_wins_and_ties_keep_fold_order() {
        let mut store = InventoryStore::new();
        let (a, b, c) = (vendor("A"), vendor("B"), vendor("C"));
        put(&mut store, Bucket::Finish, "ALY12345A12", &a, 5, Cost::Known(20.0));
        put(&mut store, Bucket::Finish, "ALY12345A12", &b, 5, Cost::Known(15.0));
        put(&mut store, Bucket::Finish, "ALY12345A12", &c, 5, Cost::Known(15.0));

        let allocation = store.get_cheapest_vendor(&part("ALY12345A12"), 1).unwrap();
        assert_eq!(allocation.vendor_name(), "B");
        assert_eq!(allocation.unit_cost(), 15.0);
        assert_eq!(allocation.bucket_label(), "Finish");
    }

    #[test]
    fn vendors_short_of_quantity_are_passed_over() {
        let mut store = InventoryStore::new();
        put(&mut store, Bucket::Finish, "ALY12345A12", &vendor("A"), 1, Cost::Known(5.0));
        put(&mut store, Bucket::Finish, "ALY12345A12", &vendor("B"), 4, Cost::Known(9.0));

        let allocation = store.get_cheapest_vendor(&part("ALY12345A12"), 3).unwrap();
        assert_eq!(allocation.vendor_name(), "B");
    }

    #[test]
    fn falls_back_to_core_bucket() {
        let mut store = InventoryStore::new();
        put(&mut store, Bucket::Core, "ALY12345A", &vendor("A"), 4, Cost::Known(30.0));

        let allocation = store.get_cheapest_vendor(&part("ALY12345A12"), 2).unwrap();
        assert_eq!(
            allocation,
            Allocation::Sourced {
                vendor: vendor("A"),
                cost: Cost::Known(30.0),
                bucket: Bucket::Core
            }
        );
        assert_eq!(
            store.record(Bucket::Core, &part("ALY12345A"), &vendor("A")).unwrap().quantity(),
            2
        );
    }

    #[test]
    fn polished_and_replica_parts_never_use_cores() {
        let mut store = InventoryStore::new();
        put(&mut store, Bucket::Core, "ALY12345A", &VendorId::in_house(), 5, Cost::Free);
        put(&mut store, Bucket::Core, "ALY12345A", &vendor("A"), 5, Cost::Known(10.0));
        let before = store.clone();

        assert_eq!(
            store.get_cheapest_vendor(&part("ALY12345A82"), 1).unwrap(),
            Allocation::NoVendor
        );
        assert_eq!(
            store.get_cheapest_vendor(&part("ALY12345A12N"), 1).unwrap(),
            Allocation::NoVendor
        );
        assert_eq!(store, before);
    }

    #[test]
    fn unknown_cost_ranks_after_priced_vendors() {
        let mut store = InventoryStore::new();
        put(&mut store, Bucket::Core, "ALY12345A", &vendor("A"), 5, Cost::Unknown);
        put(&mut store, Bucket::Core, "ALY12345A", &vendor("B"), 5, Cost::Known(50.0));

        let allocation = store.get_cheapest_vendor(&part("ALY12345A12"), 1).unwrap();
        assert_eq!(allocation.vendor_name(), "B");
    }

    #[test]
    fn unknown_cost_borrows_finish_cost() {
        let mut store = InventoryStore::new();
        let a = vendor("A");
        put(&mut store, Bucket::Finish, "ALY12345A12", &a, 1, Cost::Known(70.0));
        put(&mut store, Bucket::Core, "ALY12345A", &a, 5, Cost::Unknown);

        // Finish stock is too small, so the core entry is used at the finish price.
        let allocation = store.get_cheapest_vendor(&part("ALY12345A12"), 2).unwrap();
        assert_eq!(
            allocation,
            Allocation::Sourced {
                vendor: a,
                cost: Cost::Known(70.0),
                bucket: Bucket::Core
            }
        );
    }
}
