use geo::Point;
use serde::{Deserialize, Serialize};

/// A point feature with its raw, string-typed attributes.
///
/// Attributes keep their declaration order. Names are unique: setting an
/// attribute that already exists replaces its value in place.
///
/// # Examples
///
/// ```
/// use dggs_types::feature::Feature;
///
/// let feature = Feature::new(40.7128, -74.0060)
///     .with_attribute("floors", "12")
///     .with_attribute("floors", "14");
///
/// assert_eq!(feature.attribute("floors"), Some("14"));
/// assert_eq!(feature.attributes().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub latitude: f64,
    pub longitude: f64,
    attributes: Vec<(String, String)>,
}

impl Feature {
    /// Create a feature with no attributes.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            attributes: Vec::new(),
        }
    }

    /// Create a feature from an ordered list of `(name, value)` pairs.
    ///
    /// Later duplicates replace earlier values but keep the first position.
    pub fn with_attributes<I, K, V>(latitude: f64, longitude: f64, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut feature = Self::new(latitude, longitude);
        for (name, value) in attributes {
            feature.set_attribute(name, value);
        }
        feature
    }

    /// Builder-style variant of [`Feature::set_attribute`].
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Insert or replace an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The coordinate as a `geo::Point` (x = longitude, y = latitude).
    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

/// An attribute whose raw value is numeric-parseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredAttribute {
    pub name: String,
    pub raw_value: String,
    /// The parsed value of `raw_value`.
    pub value: f64,
}

impl FilteredAttribute {
    pub fn new(name: impl Into<String>, raw_value: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
            value,
        }
    }
}

/// Flat staging record written between loading and filtering.
///
/// This is the boundary format handed to a store for intermediate
/// persistence: one JSON object per line with the attribute map split into two
/// index-aligned arrays.
///
/// ```
/// use dggs_types::feature::{Feature, StagedFeature};
///
/// let staged = StagedFeature::from(&Feature::new(1.5, 2.5).with_attribute("a", "1"));
/// assert_eq!(staged.names, vec!["a".to_string()]);
/// assert_eq!(staged.values, vec!["1".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedFeature {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "attributes.name")]
    pub names: Vec<String>,
    #[serde(rename = "attributes.value")]
    pub values: Vec<String>,
}

impl StagedFeature {
    /// Rebuild a feature. Names without a matching value are dropped.
    pub fn to_feature(&self) -> Feature {
        Feature::with_attributes(
            self.lat,
            self.lon,
            self.names
                .iter()
                .zip(self.values.iter())
                .map(|(n, v)| (n.as_str(), v.as_str())),
        )
    }
}

impl From<&Feature> for StagedFeature {
    fn from(feature: &Feature) -> Self {
        let (names, values) = feature.attributes.iter().cloned().unzip();
        Self {
            lat: feature.latitude,
            lon: feature.longitude,
            names,
            values,
        }
    }
}

impl From<StagedFeature> for Feature {
    fn from(staged: StagedFeature) -> Self {
        staged.to_feature()
    }
}
