//! Quantizer builder for flexible configuration
//!
//! Collects settings and validates them once in [`QuantizerBuilder::build`],
//! before any feature is processed.

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Quantizer;
use std::path::Path;

/// Builder for a [`Quantizer`].
#[derive(Debug, Default)]
pub struct QuantizerBuilder {
    config: Config,
}

impl QuantizerBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a `.json` or `.toml` file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        #[cfg(feature = "toml")]
        if path.extension().is_some_and(|ext| ext == "toml") {
            self.config = Config::from_toml(&text)?;
            return Ok(self);
        }

        self.config = Config::from_json(&text)?;
        Ok(self)
    }

    /// Emit resolutions `min..=max`.
    pub fn resolutions(mut self, min: u8, max: u8) -> Self {
        self.config = self.config.with_resolutions(min, max);
        self
    }

    /// Aggregate on `workers` threads (1 = calling thread only).
    pub fn workers(mut self, workers: usize) -> Self {
        self.config = self.config.with_workers(workers);
        self
    }

    pub fn source_record_link(mut self, link: impl Into<String>) -> Self {
        self.config = self.config.with_source_record_link(link);
        self
    }

    pub fn keep_staging(mut self, keep: bool) -> Self {
        self.config = self.config.with_keep_staging(keep);
        self
    }

    /// Validate the configuration and build the quantizer.
    pub fn build(self) -> Result<Quantizer> {
        Quantizer::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuantError;
    use std::io::Write;

    #[test]
    fn test_builder_default() {
        let quantizer = QuantizerBuilder::new().build().unwrap();
        assert_eq!(quantizer.config(), &Config::default());
        assert_eq!(quantizer.resolutions().len(), 12);
    }

    #[test]
    fn test_builder_settings() {
        let quantizer = QuantizerBuilder::new()
            .resolutions(3, 7)
            .workers(2)
            .source_record_link("provenance")
            .keep_staging(true)
            .build()
            .unwrap();

        let config = quantizer.config();
        assert_eq!((config.min_resolution, config.max_resolution), (3, 7));
        assert_eq!(config.workers, 2);
        assert_eq!(config.source_record_link, "provenance");
        assert!(config.keep_staging);
    }

    #[test]
    fn test_builder_rejects_bad_resolution_before_running() {
        let err = QuantizerBuilder::new().resolutions(1, 15).build().unwrap_err();
        assert!(matches!(
            err,
            QuantError::ResolutionOutOfRange { resolution: 15, .. }
        ));
    }

    #[test]
    fn test_builder_config_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"min_resolution": 2, "max_resolution": 4}"#)
            .unwrap();

        let quantizer = QuantizerBuilder::new()
            .config_file(file.path())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(quantizer.resolutions().min(), 2);
        assert_eq!(quantizer.resolutions().max(), 4);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_builder_config_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"workers = 3\n").unwrap();

        let quantizer = QuantizerBuilder::new()
            .config_file(file.path())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(quantizer.config().workers, 3);
    }
}
