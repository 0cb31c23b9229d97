//! Run settings: a JSON file with `WHEELSOURCE_*` environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wheelsource_inventory::NormalizationSettings;
use wheelsource_vendor::FileSource;

use crate::error::RunError;

pub const ENV_FEED_ROOT: &str = "WHEELSOURCE_FEED_ROOT";
pub const ENV_ON_HAND_FILE: &str = "WHEELSOURCE_ON_HAND_FILE";
pub const ENV_VENDOR_CONFIG: &str = "WHEELSOURCE_VENDOR_CONFIG";
pub const ENV_LIST_PRICES: &str = "WHEELSOURCE_LIST_PRICES";
pub const ENV_SNAPSHOT_FILE: &str = "WHEELSOURCE_SNAPSHOT_FILE";
pub const ENV_MINIMUM_MARGIN: &str = "WHEELSOURCE_MINIMUM_MARGIN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Root that vendor file paths are resolved under.
    pub feed_root: PathBuf,
    pub on_hand_file: PathBuf,
    /// JSON array of vendor feed documents.
    pub vendor_config_file: PathBuf,
    /// `sku, price` rows, relative to `feed_root`.
    pub list_price_file: Option<FileSource>,
    pub snapshot_file: PathBuf,
    pub normalization: NormalizationSettings,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            feed_root: PathBuf::from("feeds"),
            on_hand_file: PathBuf::from("on_hand.csv"),
            vendor_config_file: PathBuf::from("vendors.json"),
            list_price_file: None,
            snapshot_file: PathBuf::from("snapshot.json"),
            normalization: NormalizationSettings::default(),
        }
    }
}

impl RunSettings {
    pub fn from_json(json: &str) -> Result<Self, RunError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| RunError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, RunError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| RunError::Settings(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, RunError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (keyed by the `ENV_*` names).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunError> {
        if let Some(root) = lookup(ENV_FEED_ROOT) {
            self.feed_root = root.into();
        }
        if let Some(path) = lookup(ENV_ON_HAND_FILE) {
            self.on_hand_file = path.into();
        }
        if let Some(path) = lookup(ENV_VENDOR_CONFIG) {
            self.vendor_config_file = path.into();
        }
        if let Some(path) = lookup(ENV_LIST_PRICES) {
            self.list_price_file = Some(FileSource::file(path));
        }
        if let Some(path) = lookup(ENV_SNAPSHOT_FILE) {
            self.snapshot_file = path.into();
        }
        if let Some(margin) = lookup(ENV_MINIMUM_MARGIN) {
            let margin = margin
                .trim()
                .parse::<f64>()
                .map_err(|_| RunError::Settings(format!("{ENV_MINIMUM_MARGIN}={margin:?} is not a number")))?;
            self.normalization.minimum_margin = margin;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), RunError> {
        self.normalization.validate()?;
        Ok(())
    }
}
