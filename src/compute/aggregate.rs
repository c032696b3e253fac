//! Grouping of filtered attribute values by cell.
//!
//! Each cell bucket counts the features that land in it and keeps one
//! [`Accumulator`] per attribute name. Features are counted individually:
//! two features with identical attribute values are two contributions.

use super::accumulator::{Accumulator, AttributeStats};
use dggs_types::cell::CellKey;
use dggs_types::feature::FilteredAttribute;
use rustc_hash::FxHashMap;

/// Accumulated state of a single cell.
///
/// Attribute order is the order in which names were first seen in this
/// cell; it is the canonical column order of the cell's output row.
#[derive(Debug, Clone, Default)]
pub struct CellBucket {
    point_count: u64,
    attributes: Vec<(String, Accumulator)>,
    positions: FxHashMap<String, usize>,
}

impl CellBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features that contributed to the cell.
    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    /// Attribute names in canonical order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    /// Record one feature and its numeric attributes.
    pub fn add_feature(&mut self, attributes: &[FilteredAttribute]) {
        self.point_count += 1;
        for attribute in attributes {
            self.accumulator_mut(&attribute.name).push(attribute.value);
        }
    }

    fn accumulator_mut(&mut self, name: &str) -> &mut Accumulator {
        let idx = match self.positions.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.attributes.len();
                self.attributes.push((name.to_string(), Accumulator::new()));
                self.positions.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.attributes[idx].1
    }

    /// Fold another bucket for the same cell into this one.
    ///
    /// Names unknown to `self` are appended after its existing names.
    pub fn merge(&mut self, other: &CellBucket) {
        self.point_count += other.point_count;
        for (name, acc) in &other.attributes {
            self.accumulator_mut(name).merge(acc);
        }
    }

    /// Finalized statistics in canonical attribute order.
    pub fn finalize(&self) -> Vec<(&str, AttributeStats)> {
        self.attributes
            .iter()
            .filter_map(|(name, acc)| acc.finalize().map(|stats| (name.as_str(), stats)))
            .collect()
    }
}

/// Cross-feature state of a run: one bucket per cell key.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    buckets: FxHashMap<CellKey, CellBucket>,
    contributions: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one feature's contribution to one cell.
    pub fn add(&mut self, key: CellKey, attributes: &[FilteredAttribute]) {
        self.buckets.entry(key).or_default().add_feature(attributes);
        self.contributions += 1;
    }

    /// Record a feature in every cell it was assigned to.
    pub fn add_feature(&mut self, keys: &[CellKey], attributes: &[FilteredAttribute]) {
        for key in keys {
            self.add(key.clone(), attributes);
        }
    }

    /// Combine the buckets of another aggregator into this one.
    pub fn merge(&mut self, other: Aggregator) {
        self.contributions += other.contributions;
        for (key, bucket) in other.buckets {
            match self.buckets.get_mut(&key) {
                Some(existing) => existing.merge(&bucket),
                None => {
                    self.buckets.insert(key, bucket);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total `(feature, cell)` pairings recorded.
    pub fn contributions(&self) -> u64 {
        self.contributions
    }

    pub fn get(&self, key: &CellKey) -> Option<&CellBucket> {
        self.buckets.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &CellBucket)> {
        self.buckets.iter()
    }

    pub fn into_buckets(self) -> impl Iterator<Item = (CellKey, CellBucket)> {
        self.buckets.into_iter()
    }
}
