//! Coordinate checks applied before a feature is staged or assigned to cells.
//!
//! A feature is usable when both coordinates are finite, latitude lies in
//! `[-90, 90]` and longitude in `[-180, 180]`. Anything else is skipped.

use crate::report::SkipReason;
use dggs_types::feature::Feature;

/// Geographic axis with its inclusive bound.
#[derive(Debug, Clone, Copy)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "Latitude",
            Axis::Longitude => "Longitude",
        }
    }

    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn check(self, value: f64) -> Result<(), SkipReason> {
        if !value.is_finite() {
            return Err(SkipReason::InvalidCoordinates(format!(
                "{} must be finite, got: {}",
                self.name(),
                value
            )));
        }
        let limit = self.limit();
        if !(-limit..=limit).contains(&value) {
            return Err(SkipReason::InvalidCoordinates(format!(
                "{} out of range [{:.1}, {:.1}]: {}",
                self.name(),
                -limit,
                limit,
                value
            )));
        }
        Ok(())
    }
}

/// Checks that a feature can be placed on the grid.
///
/// Latitude is checked first, so a feature with both coordinates broken
/// reports its latitude.
///
/// # Examples
///
/// ```
/// use dggs_quant::compute::validation::validate_feature;
/// use dggs_quant::Feature;
///
/// assert!(validate_feature(&Feature::new(40.7128, -74.0060)).is_ok());
/// assert!(validate_feature(&Feature::new(40.0, 200.0)).is_err());
/// assert!(validate_feature(&Feature::new(f64::NAN, -74.0)).is_err());
/// ```
pub fn validate_feature(feature: &Feature) -> Result<(), SkipReason> {
    Axis::Latitude.check(feature.latitude)?;
    Axis::Longitude.check(feature.longitude)
}
