//! User preferences kept in a key-value store.

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{error::Result, topology::Variant};

/// Key under which the preference record is stored.
pub const PREFS_KEY: &str = "dlVisualizerPrefs";

pub const DATASETS: &[&str] = &["mnist", "cifar10", "fashion_mnist", "imdb"];
pub const BATCH_SIZES: &[u32] = &[16, 32, 64, 128, 256];
pub const LEARNING_RATE_RANGE: (f64, f64) = (0.0001, 0.1);

/// The adjustable controls. Only `model_type` and `dark_mode` affect anything;
/// the rest are cosmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub model_type: Variant,
    pub dataset: String,
    pub learning_rate: f64,
    pub batch_size: u32,
    pub dark_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            model_type: Variant::Mlp,
            dataset: DATASETS[0].to_string(),
            learning_rate: 0.01,
            batch_size: 32,
            dark_mode: false,
        }
    }
}

impl Preferences {
    /// Switches to the next dataset name, wrapping around.
    pub fn cycle_dataset(&mut self) {
        let idx = DATASETS
            .iter()
            .position(|d| *d == self.dataset)
            .map_or(0, |i| (i + 1) % DATASETS.len());
        self.dataset = DATASETS[idx].to_string();
    }

    /// Switches to the next batch size, wrapping around.
    pub fn cycle_batch_size(&mut self) {
        let idx = BATCH_SIZES
            .iter()
            .position(|b| *b == self.batch_size)
            .map_or(0, |i| (i + 1) % BATCH_SIZES.len());
        self.batch_size = BATCH_SIZES[idx];
    }

    /// Multiplies the learning rate by `factor`, clamped to [`LEARNING_RATE_RANGE`].
    pub fn scale_learning_rate(&mut self, factor: f64) {
        let (lo, hi) = LEARNING_RATE_RANGE;
        self.learning_rate = (self.learning_rate * factor).clamp(lo, hi);
    }
}

/// Minimal string key-value persistence.
pub trait PreferencesStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON object of string values, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("ignoring corrupt preference file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }
}

impl PreferencesStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Reads the stored preferences, falling back to defaults when absent or unreadable.
pub fn load(store: &dyn PreferencesStore) -> Preferences {
    let Some(raw) = store.get(PREFS_KEY) else {
        return Preferences::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("ignoring stored preferences: {e}");
        Preferences::default()
    })
}

/// Writes `prefs` as a flat JSON record.
///
/// # Errors
/// Propagates serialization and store failures.
pub fn save(store: &mut dyn PreferencesStore, prefs: &Preferences) -> Result<()> {
    let raw = serde_json::to_string(prefs)?;
    store.set(PREFS_KEY, raw)
}
