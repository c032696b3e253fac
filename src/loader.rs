//! Feature sources.
//!
//! A loader turns some external representation into point features. Features
//! it cannot decode are returned as [`SkipReason`](crate::report::SkipReason)
//! entries instead of failing the whole load.

use crate::compute::geojson::{LoadedFeature, features_from_geojson};
use crate::error::Result;
use dggs_types::feature::Feature;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Source of point features for a run.
pub trait FeatureLoader {
    /// Load every feature, in input order.
    fn load(&mut self) -> Result<Vec<LoadedFeature>>;
}

/// In-memory feature source.
#[derive(Debug, Clone, Default)]
pub struct VecLoader {
    features: Vec<Feature>,
}

impl VecLoader {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

impl FeatureLoader for VecLoader {
    fn load(&mut self) -> Result<Vec<LoadedFeature>> {
        Ok(std::mem::take(&mut self.features)
            .into_iter()
            .map(Ok)
            .collect())
    }
}

impl From<Vec<Feature>> for VecLoader {
    fn from(features: Vec<Feature>) -> Self {
        Self::new(features)
    }
}

#[derive(Debug, Clone)]
enum GeoJsonSource {
    Text(String),
    File(PathBuf),
}

/// Loads a GeoJSON `FeatureCollection` of points.
///
/// ```
/// use dggs_quant::loader::{FeatureLoader, GeoJsonLoader};
///
/// let mut loader = GeoJsonLoader::from_text(
///     r#"{"type": "FeatureCollection", "features": []}"#,
/// );
/// assert!(loader.load().unwrap().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct GeoJsonLoader {
    source: GeoJsonSource,
}

impl GeoJsonLoader {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            source: GeoJsonSource::Text(text.into()),
        }
    }

    /// Read the document from a file when [`FeatureLoader::load`] is called.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: GeoJsonSource::File(path.as_ref().to_path_buf()),
        }
    }

    /// Read the whole document from a reader up front.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_text(text))
    }
}

impl FeatureLoader for GeoJsonLoader {
    fn load(&mut self) -> Result<Vec<LoadedFeature>> {
        let features = match &self.source {
            GeoJsonSource::Text(text) => features_from_geojson(text)?,
            GeoJsonSource::File(path) => {
                let text = std::fs::read_to_string(path)?;
                features_from_geojson(&text)?
            }
        };
        log::debug!("Loaded {} GeoJSON features", features.len());
        Ok(features)
    }
}
