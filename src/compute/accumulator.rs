//! Streaming statistics for one `(cell, attribute)` bucket.
//!
//! Count, sum, min, max and the mean/variance moments are maintained
//! incrementally (Welford's update) and merge pairwise with Chan's parallel
//! formula. Median and mode are exact order statistics, so the accumulator
//! also buffers the contributing values.

use serde::{Deserialize, Serialize};

/// Finalized statistics for one attribute of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeStats {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation; `0.0` when `count == 1`.
    pub stddev: f64,
    /// Sample variance (`n - 1` denominator); `0.0` when `count == 1`.
    pub variance: f64,
    pub median: f64,
    /// Most frequent value, smallest value on ties.
    pub mode: f64,
}

/// Mergeable accumulator over `f64` observations.
///
/// # Examples
///
/// ```
/// use dggs_quant::compute::accumulator::Accumulator;
///
/// let mut acc = Accumulator::new();
/// for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     acc.push(v);
/// }
/// let stats = acc.finalize().unwrap();
///
/// assert_eq!(stats.mean, 5.0);
/// assert_eq!(stats.median, 4.5);
/// assert_eq!(stats.mode, 4.0);
/// assert!((stats.variance - 32.0 / 7.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    mean: f64,
    m2: f64,
    values: Vec<f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add one observation.
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        self.values.push(value);
    }

    /// Combine another accumulator into this one.
    ///
    /// Associative and commutative for every finalized statistic. The value
    /// buffer is concatenated, which only affects order, never results.
    pub fn merge(&mut self, other: &Accumulator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.m2 += other.m2 + delta * delta * (self.count as f64 * other.count as f64) / total as f64;
        self.mean = (self.mean * self.count as f64 + other.mean * other.count as f64) / total as f64;
        self.count = total;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.values.extend_from_slice(&other.values);
    }

    /// Sample variance, `0.0` for a single observation.
    pub fn variance(&self) -> Option<f64> {
        match self.count {
            0 => None,
            1 => Some(0.0),
            n => Some((self.m2 / (n - 1) as f64).max(0.0)),
        }
    }

    /// Compute the final statistics. `None` when nothing was pushed.
    pub fn finalize(&self) -> Option<AttributeStats> {
        let variance = self.variance()?;

        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);

        Some(AttributeStats {
            count: self.count,
            sum: self.sum,
            min: self.min,
            max: self.max,
            mean: self.mean,
            stddev: variance.sqrt(),
            variance,
            median: median_of_sorted(&sorted)?,
            mode: mode_of_sorted(&sorted)?,
        })
    }
}

/// Median of a sorted slice: the middle value for odd lengths, the midpoint
/// of the two middle values for even lengths.
pub fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        let (lo, hi) = (sorted[mid - 1], sorted[mid]);
        // neither form can overflow for its sign combination
        if lo.is_sign_negative() != hi.is_sign_negative() {
            Some((lo + hi) / 2.0)
        } else {
            Some(lo + (hi - lo) / 2.0)
        }
    }
}

/// Exact mode of an ascending slice; the smallest value wins ties.
///
/// Values are compared numerically, so `-0.0` and `0.0` fall in the same run.
pub fn mode_of_sorted(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        let run = j - i;
        // strict comparison keeps the earlier, smaller value on ties
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((if value == 0.0 { 0.0 } else { value }, run));
        }
        i = j;
    }
    best.map(|(value, _)| value)
}
