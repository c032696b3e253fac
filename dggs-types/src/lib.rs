//! # dggs-types
//!
//! Record types shared by the DGGS quantization pipeline and its storage
//! collaborators.
//!
//! - **Input records**: `Feature`, `FilteredAttribute`, and the flat staging
//!   shape `StagedFeature`
//! - **Grid addressing**: `CellKey`
//! - **Output records**: `OutputRow`
//!
//! All types are serializable with Serde. The staging and output types use the
//! dotted nested-column names (`attributes.name`, `attributes.sum`, ...) so that
//! one JSON object per line can be loaded directly into a columnar store.
//!
//! ## Examples
//!
//! ```rust
//! use dggs_types::feature::Feature;
//!
//! let feature = Feature::new(51.5074, -0.1278)
//!     .with_attribute("height", "10")
//!     .with_attribute("name", "Big Ben");
//! assert_eq!(feature.attributes().len(), 2);
//! ```

pub mod cell;
pub mod feature;
pub mod row;

pub use cell::{CellKey, MAX_RESOLUTION, MIN_RESOLUTION};
pub use feature::{Feature, FilteredAttribute, StagedFeature};
pub use row::{GEOMETRY_TYPE_POINT, OutputRow};
