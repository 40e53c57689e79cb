//! Run configuration, read from an optional JSON file.

use std::{env, num::NonZeroUsize, path::Path, time::Duration};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    driver::DriverConfig,
    error::{DashboardError, Result},
    topology::Variant,
    visualizers::Cadence,
};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub variant: Variant,
    pub max_epochs: usize,
    pub tick_interval_ms: u64,
    /// Seed of every noise source; OS entropy when absent.
    pub seed: Option<u64>,
    pub cadence: Cadence,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Mlp,
            max_epochs: DriverConfig::DEFAULT_MAX_EPOCHS,
            tick_interval_ms: DriverConfig::DEFAULT_TICK_INTERVAL.as_millis() as u64,
            seed: None,
            cadence: Cadence::default(),
        }
    }
}

impl DashboardConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Returns `Serde` for malformed JSON and `InvalidConfig` for out-of-range values.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates the file at `path`.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, otherwise see [`DashboardConfig::from_json`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if given, else the file named by [`CONFIG_ENV`], else defaults.
    ///
    /// # Errors
    /// See [`DashboardConfig::load`].
    pub fn resolve(path: Option<String>) -> Result<Self> {
        match path.or_else(|| env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(DashboardError::InvalidConfig(
                "max_epochs must be greater than 0".into(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(DashboardError::InvalidConfig(
                "tick_interval_ms must be greater than 0".into(),
            ));
        }
        if self.cadence.feature_maps_every == 0 || self.cadence.attention_every == 0 {
            return Err(DashboardError::InvalidConfig(
                "cadence periods must be greater than 0".into(),
            ));
        }
        if !self.cadence.confusion_after.is_finite() || self.cadence.confusion_after < 0.0 {
            return Err(DashboardError::InvalidConfig(format!(
                "confusion_after ({}) must be a non-negative number",
                self.cadence.confusion_after
            )));
        }
        Ok(())
    }

    /// Bounds handed to the training driver.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `max_epochs` or `tick_interval_ms` is 0.
    pub fn driver_config(&self) -> Result<DriverConfig> {
        let max_epochs = NonZeroUsize::new(self.max_epochs).ok_or_else(|| {
            DashboardError::InvalidConfig("max_epochs must be greater than 0".into())
        })?;
        DriverConfig::new(max_epochs, Duration::from_millis(self.tick_interval_ms))
    }

    /// The configured seed, or a fresh random one.
    pub fn noise_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let c = DashboardConfig::from_json("{}").unwrap();
        assert_eq!(c, DashboardConfig::default());
        let d = c.driver_config().unwrap();
        assert_eq!(d.max_epochs(), 10);
        assert_eq!(d.tick_interval(), Duration::from_millis(1500));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let c = DashboardConfig::from_json(
            r#"{ "variant": "transformer", "max_epochs": 30, "seed": 7,
                 "cadence": { "attention_every": 5 } }"#,
        )
        .unwrap();
        assert_eq!(c.variant, Variant::Transformer);
        assert_eq!(c.max_epochs, 30);
        assert_eq!(c.noise_seed(), 7);
        assert_eq!(c.cadence.attention_every, 5);
        assert_eq!(c.cadence.feature_maps_every, 2);
    }

    #[test]
    fn unknown_variant_falls_back() {
        let c = DashboardConfig::from_json(r#"{ "variant": "gan" }"#).unwrap();
        assert_eq!(c.variant, Variant::Mlp);
    }

    #[test]
    fn rejects_zero_bounds() {
        for doc in [
            r#"{ "max_epochs": 0 }"#,
            r#"{ "tick_interval_ms": 0 }"#,
            r#"{ "cadence": { "feature_maps_every": 0 } }"#,
            r#"{ "cadence": { "confusion_after": -1.0 } }"#,
        ] {
            match DashboardConfig::from_json(doc) {
                Err(DashboardError::InvalidConfig(_)) => {}
                other => panic!("{doc}: expected InvalidConfig, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_json_is_a_serde_error() {
        assert!(matches!(
            DashboardConfig::from_json("{ max_epochs: }"),
            Err(DashboardError::Serde(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DashboardConfig::load(Path::new("/nonexistent/dashboard.json")).unwrap_err();
        assert!(matches!(err, DashboardError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
