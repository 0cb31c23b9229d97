//! Build today's inventory from local files and write the snapshot.
//!
//! Usage: `wheelsource-sync [settings.json]`. Without an argument the defaults
//! apply; either way `WHEELSOURCE_*` variables override individual fields.

use std::path::PathBuf;

use anyhow::Context;
use wheelsource_infra::{InventoryRun, JsonFileSink, LocalFileSource, LocalOnHandFile, RunSettings};
use wheelsource_vendor::VendorCatalog;

fn main() -> anyhow::Result<()> {
    wheelsource_observability::init();

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => RunSettings::from_file(&path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => RunSettings::default(),
    }
    .with_env_overrides()?;

    let vendor_json = std::fs::read_to_string(&settings.vendor_config_file).with_context(|| {
        format!("reading vendor configs from {}", settings.vendor_config_file.display())
    })?;
    let catalog = VendorCatalog::from_json(&vendor_json).context("validating vendor configs")?;
    tracing::info!(vendors = catalog.len(), "vendor configs loaded");

    let files = LocalFileSource::new(&settings.feed_root);
    let on_hand = LocalOnHandFile::new(&settings.on_hand_file);
    let mut run = InventoryRun::new(&files, &on_hand, &catalog, &settings.normalization);
    if let Some(prices) = &settings.list_price_file {
        run = run.with_list_prices(prices);
    }

    let prepared = run.prepare()?;
    let sink = JsonFileSink::new(&settings.snapshot_file);
    let entries = prepared.publish(&catalog, &sink)?;

    tracing::info!(
        run_id = %prepared.run_id,
        entries,
        report = %serde_json::to_string(&prepared.report)?,
        "run complete"
    );
    Ok(())
}
