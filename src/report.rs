//! Run diagnostics.
//!
//! Per-feature problems never abort a run. They are counted here and a
//! bounded number of samples is kept for inspection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why a feature was left out of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The feature has no geometry or no coordinate pair.
    MissingGeometry,
    /// The geometry is not a Point.
    UnsupportedGeometry(String),
    /// Coordinates are non-finite or outside the geographic range.
    InvalidCoordinates(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingGeometry => write!(f, "missing geometry"),
            SkipReason::UnsupportedGeometry(kind) => write!(f, "unsupported geometry: {}", kind),
            SkipReason::InvalidCoordinates(msg) => write!(f, "invalid coordinates: {}", msg),
        }
    }
}

/// A feature that was skipped, by position in the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: SkipReason,
}

/// Summary of one quantization run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Features read from the input, valid or not
    pub features_read: u64,
    /// Features that were assigned to cells
    pub features_processed: u64,
    /// Features skipped as malformed
    pub features_skipped: u64,
    /// Features processed without any numeric attribute
    pub features_without_numeric: u64,
    /// Total attribute values dropped as non-numeric
    pub non_numeric_values: u64,
    /// Rows emitted per resolution
    pub rows_per_resolution: BTreeMap<u8, u64>,
    /// First skipped features, up to the configured cap
    pub skipped: Vec<SkippedFeature>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of emitted rows.
    pub fn rows_emitted(&self) -> u64 {
        self.rows_per_resolution.values().sum()
    }

    pub fn record_processed(&mut self, numeric: usize, total: usize) {
        self.features_read += 1;
        self.features_processed += 1;
        if numeric == 0 {
            self.features_without_numeric += 1;
        }
        self.non_numeric_values += (total - numeric) as u64;
    }

    /// Count a skipped feature; returns true when it was kept as a sample.
    pub fn record_skipped(&mut self, index: usize, reason: SkipReason, max_samples: usize) -> bool {
        self.features_read += 1;
        self.features_skipped += 1;
        if self.skipped.len() < max_samples {
            self.skipped.push(SkippedFeature { index, reason });
            true
        } else {
            false
        }
    }

    pub fn record_row(&mut self, resolution: u8) {
        *self.rows_per_resolution.entry(resolution).or_default() += 1;
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read {} features: {} processed, {} skipped, {} rows emitted",
            self.features_read,
            self.features_processed,
            self.features_skipped,
            self.rows_emitted()
        )
    }
}
