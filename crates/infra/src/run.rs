//! One inventory run: fetch, build the store, and publish the snapshot.

use chrono::{DateTime, Utc};
use tracing::{info, info_span};
use wheelsource_core::RunId;
use wheelsource_inventory::{IngestionReport, InventoryStore, NormalizationSettings, VendorFeed};
use wheelsource_vendor::{FileSource, ListPrices, LookupTable, VendorCatalog, VendorFeedConfig};

use crate::error::RunError;
use crate::sink::SnapshotSink;
use crate::source::{FeedSource, OnHandSource};

/// Collaborators and configuration for a run.
pub struct InventoryRun<'a, F, O> {
    files: F,
    on_hand: O,
    catalog: &'a VendorCatalog,
    settings: &'a NormalizationSettings,
    list_price_file: Option<&'a FileSource>,
}

/// A built store plus everything learned while building it.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub store: InventoryStore,
    pub report: IngestionReport,
    pub list_prices: ListPrices,
}

impl<'a, F, O> InventoryRun<'a, F, O>
where
    F: FeedSource,
    O: OnHandSource,
{
    pub fn new(files: F, on_hand: O, catalog: &'a VendorCatalog, settings: &'a NormalizationSettings) -> Self {
        Self {
            files,
            on_hand,
            catalog,
            settings,
            list_price_file: None,
        }
    }

    pub fn with_list_prices(mut self, source: &'a FileSource) -> Self {
        self.list_price_file = Some(source);
        self
    }

    /// Fetch every input and build the store.
    ///
    /// All I/O happens here, before the store exists. Any upstream failure
    /// aborts the run; row-level problems only show up in the report.
    pub fn prepare(&self) -> Result<PreparedRun, RunError> {
        self.settings.validate()?;
        let run_id = RunId::new();
        let span = info_span!("inventory_run", run_id = %run_id);
        let _guard = span.enter();
        let started_at = Utc::now();

        let list_prices = match self.list_price_file {
            Some(source) => ListPrices::from_rows(
                &self
                    .files
                    .fetch_rows(source)
                    .map_err(|e| RunError::fetch("list prices", e))?,
            ),
            None => ListPrices::default(),
        };

        let report_text = self
            .on_hand
            .on_hand_report()
            .map_err(|e| RunError::fetch("on-hand report", e))?;
        let on_hand = wheelsource_inventory::parse_report(&report_text);

        let feeds = self
            .catalog
            .iter()
            .map(|config| self.fetch_feed(config))
            .collect::<Result<Vec<_>, _>>()?;

        let (store, report) = InventoryStore::build(&on_hand, &feeds, self.settings, &list_prices);
        info!(
            vendors = feeds.len(),
            kept = report.total_kept(),
            skipped = report.total_skipped(),
            list_prices = list_prices.len(),
            "inventory built"
        );

        Ok(PreparedRun {
            run_id,
            started_at,
            store,
            report,
            list_prices,
        })
    }

    fn fetch_feed<'c>(&self, config: &'c VendorFeedConfig) -> Result<VendorFeed<'c>, RunError> {
        let vendor = config.vendor();
        let span = info_span!("vendor_feed", vendor = %vendor);
        let _guard = span.enter();

        let rows = self
            .files
            .fetch_rows(&config.feed().source)
            .map_err(|e| RunError::fetch(format!("{vendor} inventory file"), e))?;
        let mut feed = VendorFeed::new(config, rows);

        if let Some(map) = config.sku_map() {
            let rows = self
                .files
                .fetch_rows(&map.source)
                .map_err(|e| RunError::fetch(format!("{vendor} sku map"), e))?;
            feed = feed.with_sku_map(LookupTable::from_rows(
                &rows,
                map.vendor_part_number_column,
                map.inhouse_part_number_column,
            ));
        }
        if let Some(map) = config.cost_map() {
            let rows = self
                .files
                .fetch_rows(&map.source)
                .map_err(|e| RunError::fetch(format!("{vendor} cost map"), e))?;
            feed = feed.with_cost_map(LookupTable::from_rows(
                &rows,
                map.part_number_column,
                map.cost_column,
            ));
        }
        info!(rows = feed.rows.len(), "fetched vendor feed");
        Ok(feed)
    }
}

impl PreparedRun {
    /// Project the store and hand the entries to `sink`, replacing the previous snapshot.
    pub fn publish<S: SnapshotSink>(&self, catalog: &VendorCatalog, sink: &S) -> Result<usize, RunError> {
        let entries = self.store.convert_to_entries(catalog);
        sink.replace(&entries)?;
        info!(run_id = %self.run_id, entries = entries.len(), "snapshot published");
        Ok(entries.len())
    }
}
