//! Attribute filtering: keep only numeric-convertible attributes.
//!
//! A value is numeric when it parses as an `i64`, or as a finite `f64`. The
//! Rust float grammar applies as-is, so surrounding whitespace makes a value
//! non-numeric, and `NaN`/`inf` spellings are rejected.

use dggs_types::feature::{Feature, FilteredAttribute};

/// Parse a raw attribute value, returning `None` for non-numeric text.
///
/// # Examples
///
/// ```
/// use dggs_quant::compute::filter::parse_numeric;
///
/// assert_eq!(parse_numeric("42"), Some(42.0));
/// assert_eq!(parse_numeric("-1.5e3"), Some(-1500.0));
/// assert_eq!(parse_numeric("tower"), None);
/// assert_eq!(parse_numeric("NaN"), None);
/// assert_eq!(parse_numeric(" 7"), None);
/// ```
pub fn parse_numeric(raw: &str) -> Option<f64> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(int as f64);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Filter `(name, raw value)` pairs down to the numeric ones, preserving order.
pub fn filter_attributes<'a, I>(attributes: I) -> Vec<FilteredAttribute>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    attributes
        .into_iter()
        .filter_map(|(name, raw)| {
            parse_numeric(raw).map(|value| FilteredAttribute::new(name, raw, value))
        })
        .collect()
}

/// Filter the attributes of a feature.
///
/// A feature without numeric attributes yields an empty list; it still
/// counts towards `point_count` downstream.
pub fn filter_feature(feature: &Feature) -> Vec<FilteredAttribute> {
    filter_attributes(
        feature
            .attributes()
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str())),
    )
}

/// Re-apply the filter to an already filtered list.
///
/// Every entry of a filtered list is numeric, so this returns it unchanged.
pub fn refilter(attributes: &[FilteredAttribute]) -> Vec<FilteredAttribute> {
    filter_attributes(
        attributes
            .iter()
            .map(|a| (a.name.as_str(), a.raw_value.as_str())),
    )
}
