//! Multi-resolution cell assignment.
//!
//! Cells are base-32 geohashes whose length equals the resolution. A
//! coordinate is encoded once at the finest configured resolution and every
//! coarser cell id is taken as a prefix of that string, which makes the
//! nesting of resolutions hold by construction.

use crate::error::{QuantError, Result};
use dggs_types::cell::{CellKey, MAX_RESOLUTION, MIN_RESOLUTION};
use geo::Rect;
use smallvec::SmallVec;
use std::ops::RangeInclusive;

/// Cell keys for one coordinate, coarsest first.
pub type CellKeys = SmallVec<[CellKey; MAX_RESOLUTION as usize]>;

/// Validated, inclusive range of grid resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionRange {
    min: u8,
    max: u8,
}

impl ResolutionRange {
    /// Build a range, rejecting bounds outside `[1, 12]` or `min > max`.
    pub fn new(min: u8, max: u8) -> Result<Self> {
        for resolution in [min, max] {
            if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
                return Err(QuantError::ResolutionOutOfRange {
                    resolution,
                    min: MIN_RESOLUTION,
                    max: MAX_RESOLUTION,
                });
            }
        }
        if min > max {
            return Err(QuantError::InvalidConfig(format!(
                "min_resolution {} is greater than max_resolution {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn len(&self) -> usize {
        usize::from(self.max - self.min) + 1
    }

    /// Never true for a validated range; provided alongside `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, resolution: u8) -> bool {
        (self.min..=self.max).contains(&resolution)
    }

    pub fn iter(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }
}

impl Default for ResolutionRange {
    fn default() -> Self {
        Self {
            min: MIN_RESOLUTION,
            max: MAX_RESOLUTION,
        }
    }
}

/// Maps coordinates to cells at every resolution of a range.
///
/// # Examples
///
/// ```rust
/// use dggs_quant::compute::grid::{GridAssigner, ResolutionRange};
///
/// let assigner = GridAssigner::new(ResolutionRange::new(1, 5).unwrap());
/// let cells = assigner.assign(57.64911, 10.40744).unwrap();
///
/// assert_eq!(cells.len(), 5);
/// assert_eq!(cells[4].cell_id, "u4pru");
/// assert!(cells[0].is_ancestor_of(&cells[4]));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GridAssigner {
    range: ResolutionRange,
}

impl GridAssigner {
    pub fn new(range: ResolutionRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> ResolutionRange {
        self.range
    }

    /// Cell id of a coordinate at a single resolution.
    pub fn cell_id(latitude: f64, longitude: f64, resolution: u8) -> Result<String> {
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
            return Err(QuantError::ResolutionOutOfRange {
                resolution,
                min: MIN_RESOLUTION,
                max: MAX_RESOLUTION,
            });
        }
        encode(latitude, longitude, resolution)
    }

    /// One cell key per configured resolution, coarsest first.
    pub fn assign(&self, latitude: f64, longitude: f64) -> Result<CellKeys> {
        let finest = encode(latitude, longitude, self.range.max)?;
        Ok(self
            .range
            .iter()
            .map(|resolution| CellKey::new(resolution, &finest[..usize::from(resolution)]))
            .collect())
    }
}

fn encode(latitude: f64, longitude: f64, resolution: u8) -> Result<String> {
    let coord = geohash::Coord {
        x: longitude,
        y: latitude,
    };
    geohash::encode(coord, usize::from(resolution)).map_err(|e| {
        QuantError::InvalidGeohash(format!(
            "Cannot encode ({}, {}) at resolution {}: {}",
            latitude, longitude, resolution, e
        ))
    })
}

/// Bounding rectangle of a cell (x = longitude, y = latitude).
pub fn cell_bounds(key: &CellKey) -> Result<Rect> {
    geohash::decode_bbox(&key.cell_id)
        .map_err(|e| QuantError::InvalidGeohash(format!("{}: {}", key.cell_id, e)))
}
