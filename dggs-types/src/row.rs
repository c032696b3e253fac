use serde::{Deserialize, Serialize};

/// The only geometry type emitted by the quantizer.
pub const GEOMETRY_TYPE_POINT: &str = "Point";

/// One quantized grid cell with per-attribute statistics.
///
/// Every `attributes.*` array is index-aligned with `attribute_names`: entry
/// `i` of `sum`, `min`, ... `mode` describes the attribute named
/// `attribute_names[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub grid_id: String,
    pub resolution: u8,
    pub geometry_type: String,
    pub source_record_link: String,
    pub point_count: u64,
    #[serde(rename = "attributes.name")]
    pub attribute_names: Vec<String>,
    #[serde(rename = "attributes.sum")]
    pub sum: Vec<f64>,
    #[serde(rename = "attributes.min")]
    pub min: Vec<f64>,
    #[serde(rename = "attributes.max")]
    pub max: Vec<f64>,
    #[serde(rename = "attributes.mean")]
    pub mean: Vec<f64>,
    #[serde(rename = "attributes.stddev")]
    pub stddev: Vec<f64>,
    #[serde(rename = "attributes.variance")]
    pub variance: Vec<f64>,
    #[serde(rename = "attributes.median")]
    pub median: Vec<f64>,
    #[serde(rename = "attributes.mode")]
    pub mode: Vec<f64>,
}

impl OutputRow {
    /// Position of `name` in the attribute arrays.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attribute_names.iter().position(|n| n == name)
    }

    /// True when every statistic array has the same length as the name array.
    pub fn is_aligned(&self) -> bool {
        let n = self.attribute_names.len();
        [
            &self.sum,
            &self.min,
            &self.max,
            &self.mean,
            &self.stddev,
            &self.variance,
            &self.median,
            &self.mode,
        ]
        .iter()
        .all(|column| column.len() == n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> OutputRow {
        OutputRow {
            grid_id: "u".into(),
            resolution: 1,
            geometry_type: GEOMETRY_TYPE_POINT.into(),
            source_record_link: "link".into(),
            point_count: 2,
            attribute_names: vec!["a".into(), "b".into()],
            sum: vec![1.0, 2.0],
            min: vec![1.0, 2.0],
            max: vec![1.0, 2.0],
            mean: vec![1.0, 2.0],
            stddev: vec![0.0, 0.0],
            variance: vec![0.0, 0.0],
            median: vec![1.0, 2.0],
            mode: vec![1.0, 2.0],
        }
    }

    #[test]
    fn test_nested_column_names() {
        let json = serde_json::to_value(row()).unwrap();
        for key in [
            "grid_id",
            "resolution",
            "geometry_type",
            "source_record_link",
            "point_count",
            "attributes.name",
            "attributes.sum",
            "attributes.min",
            "attributes.max",
            "attributes.mean",
            "attributes.stddev",
            "attributes.variance",
            "attributes.median",
            "attributes.mode",
        ] {
            assert!(json.get(key).is_some(), "missing column {key}");
        }
    }

    #[test]
    fn test_alignment() {
        let mut r = row();
        assert!(r.is_aligned());
        assert_eq!(r.attribute_index("b"), Some(1));
        r.mode.pop();
        assert!(!r.is_aligned());
    }
}
