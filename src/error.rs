//! Error types for the quantization pipeline.
//!
//! Only run-level failures are errors. Problems with individual features are
//! recovered and recorded in the [`RunReport`](crate::report::RunReport).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantError {
    #[error("Resolution {resolution} outside supported range [{min}, {max}]")]
    ResolutionOutOfRange { resolution: u8, min: u8, max: u8 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid geohash: {0}")]
    InvalidGeohash(String),
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Worker error: {0}")]
    Worker(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for QuantError {
    fn from(err: toml::de::Error) -> Self {
        QuantError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuantError>;
