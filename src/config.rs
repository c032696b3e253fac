//! Quantizer configuration.
//!
//! Resolved and validated once when a [`Quantizer`](crate::Quantizer) is
//! built; a run never re-reads it.

use crate::compute::grid::ResolutionRange;
use crate::error::{QuantError, Result};
use dggs_types::cell::{MAX_RESOLUTION, MIN_RESOLUTION};
use serde::{Deserialize, Serialize};

/// Quantizer configuration
///
/// Serializable so it can be loaded from JSON or TOML.
///
/// # Example
///
/// ```rust
/// use dggs_quant::Config;
///
/// let config = Config::default();
/// assert_eq!(config.min_resolution, 1);
/// assert_eq!(config.max_resolution, 12);
///
/// let json = r#"{
///     "min_resolution": 3,
///     "max_resolution": 9,
///     "workers": 4
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.workers, 4);
/// assert_eq!(config.source_record_link, "link");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Coarsest resolution to emit (1-12, default: 1)
    #[serde(default = "Config::default_min_resolution")]
    pub min_resolution: u8,

    /// Finest resolution to emit (1-12, default: 12)
    #[serde(default = "Config::default_max_resolution")]
    pub max_resolution: u8,

    /// Number of aggregation workers. 1 runs the pipeline on the calling thread.
    #[serde(default = "Config::default_workers")]
    pub workers: usize,

    /// Bounded queue length per worker when `workers > 1`.
    #[serde(default = "Config::default_channel_capacity")]
    pub channel_capacity: usize,

    /// Constant written to every row's `source_record_link`.
    #[serde(default = "Config::default_source_record_link")]
    pub source_record_link: String,

    /// Number of skipped-feature samples kept in the run report
    #[serde(default = "Config::default_max_reported_skips")]
    pub max_reported_skips: usize,

    /// Keep the staging records in the store after an ingest
    #[serde(default)]
    pub keep_staging: bool,
}

impl Config {
    const fn default_min_resolution() -> u8 {
        MIN_RESOLUTION
    }

    const fn default_max_resolution() -> u8 {
        MAX_RESOLUTION
    }

    const fn default_workers() -> usize {
        1
    }

    const fn default_channel_capacity() -> usize {
        1024
    }

    fn default_source_record_link() -> String {
        "link".to_string()
    }

    const fn default_max_reported_skips() -> usize {
        100
    }

    /// Restrict the emitted resolutions. Checked by [`Config::validate`].
    pub fn with_resolutions(mut self, min: u8, max: u8) -> Self {
        self.min_resolution = min;
        self.max_resolution = max;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_source_record_link(mut self, link: impl Into<String>) -> Self {
        self.source_record_link = link.into();
        self
    }

    pub fn with_max_reported_skips(mut self, max: usize) -> Self {
        self.max_reported_skips = max;
        self
    }

    pub fn with_keep_staging(mut self, keep: bool) -> Self {
        self.keep_staging = keep;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        ResolutionRange::new(self.min_resolution, self.max_resolution)?;

        if self.workers == 0 {
            return Err(QuantError::InvalidConfig(
                "Worker count must be greater than zero".to_string(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(QuantError::InvalidConfig(
                "Channel capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| QuantError::InvalidConfig(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_resolution: Self::default_min_resolution(),
            max_resolution: Self::default_max_resolution(),
            workers: Self::default_workers(),
            channel_capacity: Self::default_channel_capacity(),
            source_record_link: Self::default_source_record_link(),
            max_reported_skips: Self::default_max_reported_skips(),
            keep_staging: false,
        }
    }
}
