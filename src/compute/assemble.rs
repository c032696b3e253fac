//! Conversion of finalized cell buckets into output rows.

use super::aggregate::{Aggregator, CellBucket};
use dggs_types::cell::CellKey;
use dggs_types::row::{GEOMETRY_TYPE_POINT, OutputRow};

/// Builds one [`OutputRow`] per cell.
#[derive(Debug, Clone)]
pub struct RowAssembler {
    source_record_link: String,
}

impl RowAssembler {
    pub fn new(source_record_link: impl Into<String>) -> Self {
        Self {
            source_record_link: source_record_link.into(),
        }
    }

    /// Build the row of a single cell. Every statistic column follows the
    /// bucket's canonical attribute order.
    pub fn assemble(&self, key: &CellKey, bucket: &CellBucket) -> OutputRow {
        let stats = bucket.finalize();
        let n = stats.len();

        let mut row = OutputRow {
            grid_id: key.cell_id.clone(),
            resolution: key.resolution,
            geometry_type: GEOMETRY_TYPE_POINT.to_string(),
            source_record_link: self.source_record_link.clone(),
            point_count: bucket.point_count(),
            attribute_names: Vec::with_capacity(n),
            sum: Vec::with_capacity(n),
            min: Vec::with_capacity(n),
            max: Vec::with_capacity(n),
            mean: Vec::with_capacity(n),
            stddev: Vec::with_capacity(n),
            variance: Vec::with_capacity(n),
            median: Vec::with_capacity(n),
            mode: Vec::with_capacity(n),
        };

        for (name, s) in stats {
            row.attribute_names.push(name.to_string());
            row.sum.push(s.sum);
            row.min.push(s.min);
            row.max.push(s.max);
            row.mean.push(s.mean);
            row.stddev.push(s.stddev);
            row.variance.push(s.variance);
            row.median.push(s.median);
            row.mode.push(s.mode);
        }

        row
    }

    /// Finalize every bucket of an aggregator, ordered by `(grid_id, resolution)`.
    pub fn assemble_all(&self, aggregator: Aggregator) -> Vec<OutputRow> {
        let mut rows: Vec<OutputRow> = aggregator
            .into_buckets()
            .map(|(key, bucket)| self.assemble(&key, &bucket))
            .collect();
        rows.sort_by(|a, b| {
            a.grid_id
                .cmp(&b.grid_id)
                .then(a.resolution.cmp(&b.resolution))
        });
        rows
    }
}

impl Default for RowAssembler {
    fn default() -> Self {
        Self::new("link")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dggs_types::feature::FilteredAttribute;

    fn attr(name: &str, value: f64) -> FilteredAttribute {
        FilteredAttribute::new(name, value.to_string(), value)
    }

    #[test]
    fn test_columns_are_index_aligned() {
        let mut bucket = CellBucket::new();
        bucket.add_feature(&[attr("height", 10.0), attr("floors", 3.0)]);
        bucket.add_feature(&[attr("floors", 5.0)]);
        bucket.add_feature(&[attr("height", 20.0), attr("floors", 4.0)]);

        let row = RowAssembler::new("link").assemble(&CellKey::new(3, "gcp"), &bucket);

        assert!(row.is_aligned());
        assert_eq!(row.grid_id, "gcp");
        assert_eq!(row.resolution, 3);
        assert_eq!(row.geometry_type, "Point");
        assert_eq!(row.source_record_link, "link");
        assert_eq!(row.point_count, 3);
        assert_eq!(row.attribute_names, vec!["height", "floors"]);

        let h = row.attribute_index("height").unwrap();
        assert_eq!(row.sum[h], 30.0);
        assert_eq!(row.median[h], 15.0);

        let f = row.attribute_index("floors").unwrap();
        assert_eq!(row.sum[f], 12.0);
        assert_eq!(row.min[f], 3.0);
        assert_eq!(row.max[f], 5.0);
        assert_eq!(row.mean[f], 4.0);
        assert_eq!(row.variance[f], 1.0);
        assert_eq!(row.stddev[f], 1.0);
        assert_eq!(row.mode[f], 3.0);
    }

    #[test]
    fn test_empty_attribute_row() {
        let mut bucket = CellBucket::new();
        bucket.add_feature(&[]);
        let row = RowAssembler::default().assemble(&CellKey::new(1, "s"), &bucket);
        assert_eq!(row.point_count, 1);
        assert!(row.attribute_names.is_empty());
        assert!(row.is_aligned());
    }

    #[test]
    fn test_rows_sorted_by_grid_then_resolution() {
        let mut agg = Aggregator::new();
        for key in [
            CellKey::new(2, "u4"),
            CellKey::new(1, "g"),
            CellKey::new(1, "u"),
            CellKey::new(2, "gc"),
        ] {
            agg.add(key, &[]);
        }
        let rows = RowAssembler::default().assemble_all(agg);
        let ids: Vec<(&str, u8)> = rows
            .iter()
            .map(|r| (r.grid_id.as_str(), r.resolution))
            .collect();
        assert_eq!(ids, vec![("g", 1), ("gc", 2), ("u", 1), ("u4", 2)]);
    }
}
