//! GeoJSON decoding of point features.
//!
//! The document is parsed as plain JSON first and every feature is decoded on
//! its own, so one bad feature becomes a skip instead of failing the load.

use crate::error::{QuantError, Result};
use crate::report::SkipReason;
use dggs_types::feature::Feature;
use geojson::{Geometry, JsonObject, JsonValue, Value};

/// A decoded feature, or the reason it cannot be used.
pub type LoadedFeature = std::result::Result<Feature, SkipReason>;

/// Parses a GeoJSON document into point features.
///
/// Accepts a `FeatureCollection` or a single `Feature`. Positions are
/// `[longitude, latitude]`. Features without a usable Point geometry are
/// returned as `Err(SkipReason)` entries so that callers can report them.
/// Only a document that is not JSON, or not a `FeatureCollection`/`Feature`,
/// is an error.
///
/// # Examples
///
/// ```
/// use dggs_quant::compute::geojson::features_from_geojson;
///
/// let doc = r#"{
///   "type": "FeatureCollection",
///   "features": [
///     {"type": "Feature",
///      "geometry": {"type": "Point", "coordinates": [10.4, 57.6]},
///      "properties": {"height": 10, "name": "mast"}},
///     {"type": "Feature",
///      "geometry": {"type": "Point", "coordinates": [10.4]},
///      "properties": {"height": 12}}
///   ]
/// }"#;
///
/// let features = features_from_geojson(doc).unwrap();
/// let feature = features[0].as_ref().unwrap();
/// assert_eq!(feature.latitude, 57.6);
/// assert_eq!(feature.attribute("height"), Some("10"));
/// assert!(features[1].is_err());
/// ```
pub fn features_from_geojson(geojson: &str) -> Result<Vec<LoadedFeature>> {
    let document: JsonValue =
        serde_json::from_str(geojson).map_err(|e| QuantError::GeoJson(e.to_string()))?;
    let Some(object) = document.as_object() else {
        return Err(QuantError::InvalidInput(
            "Expected a GeoJSON object at the top level".to_string(),
        ));
    };

    match object.get("type").and_then(JsonValue::as_str) {
        Some("FeatureCollection") => match object.get("features") {
            Some(JsonValue::Array(features)) => Ok(features.iter().map(decode_feature).collect()),
            _ => Err(QuantError::GeoJson(
                "FeatureCollection without a `features` array".to_string(),
            )),
        },
        Some("Feature") => Ok(vec![decode_feature(&document)]),
        Some(other) => Err(QuantError::InvalidInput(format!(
            "Expected a GeoJSON FeatureCollection or Feature, got {}",
            other
        ))),
        None => Err(QuantError::GeoJson("Missing GeoJSON `type` member".to_string())),
    }
}

fn decode_feature(value: &JsonValue) -> LoadedFeature {
    let feature = value.as_object().ok_or(SkipReason::MissingGeometry)?;
    let geometry = match feature.get("geometry") {
        Some(JsonValue::Object(geometry)) => geometry,
        _ => return Err(SkipReason::MissingGeometry),
    };

    let (longitude, latitude) = decode_point(geometry)?;

    let mut decoded = Feature::new(latitude, longitude);
    if let Some(JsonValue::Object(properties)) = feature.get("properties") {
        for (name, value) in properties {
            decoded.set_attribute(name.as_str(), property_text(value));
        }
    }
    Ok(decoded)
}

/// `(longitude, latitude)` of a Point geometry object.
fn decode_point(geometry: &JsonObject) -> std::result::Result<(f64, f64), SkipReason> {
    match geometry.get("type").and_then(JsonValue::as_str) {
        Some("Point") => {}
        Some(kind) => return Err(SkipReason::UnsupportedGeometry(kind.to_string())),
        None => return Err(SkipReason::MissingGeometry),
    }
    if geometry.get("coordinates").is_none_or(JsonValue::is_null) {
        return Err(SkipReason::MissingGeometry);
    }

    let parsed = Geometry::try_from(geometry.clone())
        .map_err(|e| SkipReason::InvalidCoordinates(e.to_string()))?;
    match &parsed.value {
        Value::Point(position) => match position.as_slice() {
            [longitude, latitude, ..] => Ok((*longitude, *latitude)),
            _ => Err(SkipReason::InvalidCoordinates(format!(
                "Position needs two values, got {}",
                position.len()
            ))),
        },
        _ => Err(SkipReason::MissingGeometry),
    }
}

/// Text form of a property value: strings verbatim, everything else as JSON.
fn property_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
