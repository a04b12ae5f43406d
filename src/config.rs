use crate::constants::{DEFAULT_RECORD_COUNT, DEFAULT_SEED};
use crate::error::{EtlError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings for a pipeline instance.
///
/// Every field has a default, so an empty TOML file (or no file at all) yields a working
/// configuration with no simulated latency.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    /// Directory the CSV destination writes into
    pub output_dir: PathBuf,
    /// Simulated per-stage latency in milliseconds
    pub stage_delay_ms: u64,
    /// Seed for the synthetic sample source
    pub seed: u64,
    /// Number of synthetic records per extraction
    pub record_count: usize,
    /// Last day of the synthetic date range; today when unset
    pub end_date: Option<NaiveDate>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            stage_delay_ms: 0,
            seed: DEFAULT_SEED,
            record_count: DEFAULT_RECORD_COUNT,
            end_date: None,
        }
    }
}

impl EtlConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EtlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.record_count == 0 {
            return Err(EtlError::Config("record_count must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}
