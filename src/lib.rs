//! Quantization of geospatial point features into a multi-resolution
//! geohash grid with per-cell attribute statistics.
//!
//! Each feature is assigned to one cell per resolution (1-12 by default). For
//! every cell the numeric attributes of its features are summarized as count,
//! sum, min, max, mean, sample standard deviation, sample variance, median and
//! mode, and emitted as one flat row with index-aligned attribute arrays.
//!
//! ```rust
//! use dggs_quant::{Feature, Quantizer};
//!
//! let quantizer = Quantizer::builder().resolutions(1, 1).build()?;
//! let output = quantizer.quantize(vec![
//!     Feature::new(48.85, 2.35).with_attribute("height", "10"),
//!     Feature::new(48.86, 2.34).with_attribute("height", "10"),
//!     Feature::new(48.87, 2.33).with_attribute("height", "10"),
//! ])?;
//!
//! let row = &output.rows[0];
//! assert_eq!(row.point_count, 3);
//! assert_eq!(row.sum, vec![30.0]);
//! assert_eq!(row.stddev, vec![0.0]);
//! # Ok::<(), dggs_quant::QuantError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod storage;

pub use builder::QuantizerBuilder;
pub use config::Config;
pub use error::{QuantError, Result};
pub use pipeline::{QuantizeOutput, Quantizer};

pub use dggs_types::{CellKey, Feature, FilteredAttribute, OutputRow, StagedFeature};

pub use compute::accumulator::{Accumulator, AttributeStats};
pub use compute::grid::{GridAssigner, ResolutionRange};
pub use loader::{FeatureLoader, GeoJsonLoader, VecLoader};
pub use report::{RunReport, SkipReason, SkippedFeature};
pub use storage::{JsonLinesStore, MemoryStore, Store, StoreStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{Config, QuantError, Quantizer, QuantizerBuilder, Result};

    pub use crate::{CellKey, Feature, OutputRow};

    pub use crate::{FeatureLoader, GeoJsonLoader, VecLoader};

    pub use crate::{JsonLinesStore, MemoryStore, Store};
}
