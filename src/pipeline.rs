//! The quantization run.
//!
//! Features flow strictly forward: validation, attribute filtering, cell
//! assignment at every configured resolution, aggregation, row assembly.
//! Only the aggregation stage holds cross-feature state.
//!
//! ```rust
//! use dggs_quant::{Config, Feature, Quantizer};
//!
//! let quantizer = Quantizer::new(Config::default().with_resolutions(1, 3))?;
//! let output = quantizer.quantize(vec![
//!     Feature::new(57.64911, 10.40744).with_attribute("height", "10"),
//!     Feature::new(57.64911, 10.40744).with_attribute("height", "20"),
//! ])?;
//!
//! assert_eq!(output.rows.len(), 3);
//! assert_eq!(output.rows[0].grid_id, "u");
//! assert_eq!(output.rows[0].point_count, 2);
//! assert_eq!(output.rows[0].mean, vec![15.0]);
//! # Ok::<(), dggs_quant::QuantError>(())
//! ```

use crate::builder::QuantizerBuilder;
use crate::compute::aggregate::Aggregator;
use crate::compute::assemble::RowAssembler;
use crate::compute::filter::filter_feature;
use crate::compute::geojson::LoadedFeature;
use crate::compute::grid::{CellKeys, GridAssigner, ResolutionRange};
use crate::compute::validation::validate_feature;
use crate::config::Config;
use crate::error::{QuantError, Result};
use crate::loader::FeatureLoader;
use crate::report::{RunReport, SkipReason};
use crate::storage::Store;
use crossbeam::channel;
use dggs_types::cell::CellKey;
use dggs_types::feature::{Feature, FilteredAttribute, StagedFeature};
use dggs_types::row::OutputRow;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Rows and diagnostics of a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantizeOutput {
    /// One row per `(grid_id, resolution)`, ordered by grid id then resolution
    pub rows: Vec<OutputRow>,
    pub report: RunReport,
}

/// A feature ready for aggregation.
struct Prepared {
    cells: CellKeys,
    attributes: Vec<FilteredAttribute>,
}

/// Configured quantization pipeline.
///
/// A `Quantizer` holds only validated configuration; every run starts from
/// empty accumulators, so a failed run can simply be repeated.
#[derive(Debug, Clone)]
pub struct Quantizer {
    config: Config,
    assigner: GridAssigner,
    assembler: RowAssembler,
}

impl Quantizer {
    /// Validate `config` and build a quantizer.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let range = ResolutionRange::new(config.min_resolution, config.max_resolution)?;
        Ok(Self {
            assigner: GridAssigner::new(range),
            assembler: RowAssembler::new(config.source_record_link.clone()),
            config,
        })
    }

    pub fn builder() -> QuantizerBuilder {
        QuantizerBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolutions(&self) -> ResolutionRange {
        self.assigner.range()
    }

    /// Quantize well-formed features.
    pub fn quantize<I>(&self, features: I) -> Result<QuantizeOutput>
    where
        I: IntoIterator<Item = Feature>,
    {
        self.quantize_loaded(features.into_iter().map(Ok))
    }

    /// Quantize loader output; `Err` entries are reported as skipped.
    pub fn quantize_loaded<I>(&self, features: I) -> Result<QuantizeOutput>
    where
        I: IntoIterator<Item = LoadedFeature>,
    {
        let mut report = RunReport::new();
        let rows = self.execute(features.into_iter().enumerate(), &mut report)?;
        Ok(QuantizeOutput { rows, report })
    }

    /// Load every feature from `loader` and quantize it.
    pub fn run(&self, loader: &mut dyn FeatureLoader) -> Result<QuantizeOutput> {
        let loaded = loader.load()?;
        self.quantize_loaded(loaded)
    }

    /// Full ingestion: load, stage, quantize the staged records, write rows,
    /// then drop the staging data unless `keep_staging` is set.
    ///
    /// Store failures are fatal. The store is not touched while aggregating.
    pub fn ingest(&self, loader: &mut dyn FeatureLoader, store: &mut dyn Store) -> Result<RunReport> {
        let mut report = RunReport::new();

        let mut staged = Vec::new();
        let mut origins = Vec::new();
        for (index, item) in loader.load()?.into_iter().enumerate() {
            // Non-finite coordinates have no JSON encoding, so invalid
            // features never reach the staging table.
            match item.and_then(|f| validate_feature(&f).map(|_| f)) {
                Ok(feature) => {
                    staged.push(StagedFeature::from(&feature));
                    origins.push(index);
                }
                Err(reason) => self.skip(index, reason, &mut report),
            }
        }

        store.stage(&staged)?;
        log::info!("Staged {} features", staged.len());
        drop(staged);

        let staged = store.staged()?;
        if staged.len() != origins.len() {
            return Err(QuantError::Store(format!(
                "Staging table holds {} records, expected {}",
                staged.len(),
                origins.len()
            )));
        }

        let items = origins
            .into_iter()
            .zip(staged)
            .map(|(index, record)| (index, Ok(record.to_feature())));
        let rows = self.execute(items, &mut report)?;

        store.write_rows(&rows)?;
        if !self.config.keep_staging {
            store.cleanup()?;
        }
        store.sync()?;

        report.skipped.sort_by_key(|s| s.index);
        Ok(report)
    }

    fn execute<I>(&self, items: I, report: &mut RunReport) -> Result<Vec<OutputRow>>
    where
        I: Iterator<Item = (usize, LoadedFeature)>,
    {
        let range = self.assigner.range();
        log::info!(
            "Quantizing at resolutions {}..={} with {} worker(s)",
            range.min(),
            range.max(),
            self.config.workers
        );

        let aggregator = if self.config.workers > 1 {
            self.aggregate_partitioned(items, report)?
        } else {
            self.aggregate_sequential(items, report)
        };

        let rows = self.assembler.assemble_all(aggregator);
        for row in &rows {
            report.record_row(row.resolution);
        }

        log::info!("{}", report);
        Ok(rows)
    }

    fn aggregate_sequential<I>(&self, items: I, report: &mut RunReport) -> Aggregator
    where
        I: Iterator<Item = (usize, LoadedFeature)>,
    {
        let mut aggregator = Aggregator::new();
        for (index, item) in items {
            if let Some(prepared) = self.prepare(index, item, report) {
                aggregator.add_feature(&prepared.cells, &prepared.attributes);
            }
        }
        aggregator
    }

    /// Fan `(cell, attributes)` pairs out to workers by cell hash. Each worker
    /// owns every bucket of its partition, so the final merge only unions
    /// disjoint maps.
    fn aggregate_partitioned<I>(&self, items: I, report: &mut RunReport) -> Result<Aggregator>
    where
        I: Iterator<Item = (usize, LoadedFeature)>,
    {
        let workers = self.config.workers;
        let capacity = self.config.channel_capacity;

        std::thread::scope(|scope| {
            let mut senders = Vec::with_capacity(workers);
            let mut handles = Vec::with_capacity(workers);

            for worker in 0..workers {
                let (tx, rx) = channel::bounded::<(CellKey, Arc<[FilteredAttribute]>)>(capacity);
                senders.push(tx);
                handles.push(scope.spawn(move || {
                    let mut aggregator = Aggregator::new();
                    for (key, attributes) in rx {
                        aggregator.add(key, &attributes);
                    }
                    log::debug!("Worker {} aggregated {} cells", worker, aggregator.len());
                    aggregator
                }));
            }

            let mut disconnected = false;
            'features: for (index, item) in items {
                let Some(prepared) = self.prepare(index, item, report) else {
                    continue;
                };
                let attributes: Arc<[FilteredAttribute]> = prepared.attributes.into();
                for key in prepared.cells {
                    let target = partition(&key, workers);
                    if senders[target].send((key, Arc::clone(&attributes))).is_err() {
                        disconnected = true;
                        break 'features;
                    }
                }
            }
            drop(senders);

            let mut merged = Aggregator::new();
            let mut failed = 0;
            for handle in handles {
                match handle.join() {
                    Ok(partial) => merged.merge(partial),
                    Err(_) => failed += 1,
                }
            }

            if failed > 0 || disconnected {
                return Err(QuantError::Worker(format!(
                    "{} of {} aggregation workers failed",
                    failed.max(1),
                    workers
                )));
            }
            Ok(merged)
        })
    }

    fn prepare(&self, index: usize, item: LoadedFeature, report: &mut RunReport) -> Option<Prepared> {
        let feature = match item.and_then(|f| validate_feature(&f).map(|_| f)) {
            Ok(feature) => feature,
            Err(reason) => {
                self.skip(index, reason, report);
                return None;
            }
        };

        let cells = match self.assigner.assign(feature.latitude, feature.longitude) {
            Ok(cells) => cells,
            Err(e) => {
                self.skip(index, SkipReason::InvalidCoordinates(e.to_string()), report);
                return None;
            }
        };

        let attributes = filter_feature(&feature);
        report.record_processed(attributes.len(), feature.attributes().len());
        Some(Prepared { cells, attributes })
    }

    fn skip(&self, index: usize, reason: SkipReason, report: &mut RunReport) {
        let message = reason.to_string();
        if report.record_skipped(index, reason, self.config.max_reported_skips) {
            log::warn!("Skipping feature {}: {}", index, message);
        }
    }
}

fn partition(key: &CellKey, workers: usize) -> usize {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % workers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::VecLoader;
    use crate::storage::MemoryStore;

    fn sample_features() -> Vec<Feature> {
        (0..40)
            .map(|i| {
                let lat = -60.0 + (i as f64) * 3.1;
                let lon = -170.0 + (i as f64) * 8.7;
                Feature::new(lat, lon)
                    .with_attribute("a", (i % 7).to_string())
                    .with_attribute("label", format!("p{}", i))
                    .with_attribute("b", format!("{}.5", i % 3))
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let quantizer = Quantizer::new(Config::default()).unwrap();
        let output = quantizer.quantize(Vec::new()).unwrap();
        assert!(output.rows.is_empty());
        assert_eq!(output.report, RunReport::new());
    }

    #[test]
    fn test_fan_out_per_resolution() {
        let quantizer = Quantizer::new(Config::default()).unwrap();
        let output = quantizer
            .quantize(vec![Feature::new(10.0, 10.0).with_attribute("v", "1")])
            .unwrap();
        assert_eq!(output.rows.len(), 12);
        assert_eq!(output.report.rows_per_resolution.len(), 12);
        assert!(output.rows.iter().all(|r| r.point_count == 1));
    }

    #[test]
    fn test_skips_are_reported() {
        let quantizer = Quantizer::new(Config::default().with_resolutions(1, 2)).unwrap();
        let output = quantizer
            .quantize_loaded(vec![
                Ok(Feature::new(10.0, 10.0)),
                Err(SkipReason::MissingGeometry),
                Ok(Feature::new(f64::NAN, 10.0)),
            ])
            .unwrap();

        assert_eq!(output.report.features_read, 3);
        assert_eq!(output.report.features_processed, 1);
        assert_eq!(output.report.features_skipped, 2);
        let indices: Vec<usize> = output.report.skipped.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(output.rows.len(), 2);
    }

    #[test]
    fn test_partitioned_matches_sequential() {
        let sequential = Quantizer::new(Config::default()).unwrap();
        let parallel =
            Quantizer::new(Config::default().with_workers(4).with_channel_capacity(3)).unwrap();

        let a = sequential.quantize(sample_features()).unwrap();
        let b = parallel.quantize(sample_features()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_partition_is_stable() {
        let key = CellKey::new(5, "u4pru");
        let first = partition(&key, 8);
        assert!(first < 8);
        assert_eq!(partition(&key, 8), first);
        assert_eq!(partition(&key, 1), 0);
    }

    #[test]
    fn test_ingest_stages_and_cleans_up() {
        let quantizer = Quantizer::new(Config::default().with_resolutions(1, 1)).unwrap();
        let mut loader = VecLoader::new(vec![
            Feature::new(10.0, 10.0).with_attribute("v", "2"),
            Feature::new(10.0, 10.0).with_attribute("v", "4"),
        ]);
        let mut store = MemoryStore::new();

        let report = quantizer.ingest(&mut loader, &mut store).unwrap();
        assert_eq!(report.features_processed, 2);
        assert_eq!(report.rows_emitted(), 1);

        let rows = store.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mean, vec![3.0]);
        assert!(store.staged().unwrap().is_empty());
    }

    #[test]
    fn test_ingest_keep_staging() {
        let config = Config::default().with_resolutions(1, 1).with_keep_staging(true);
        let quantizer = Quantizer::new(config).unwrap();
        let mut loader = VecLoader::new(vec![Feature::new(10.0, 10.0)]);
        let mut store = MemoryStore::new();

        quantizer.ingest(&mut loader, &mut store).unwrap();
        assert_eq!(store.staged().unwrap().len(), 1);
    }

    #[test]
    fn test_ingest_validates_before_staging() {
        let config = Config::default().with_resolutions(1, 1).with_keep_staging(true);
        let quantizer = Quantizer::new(config).unwrap();
        let mut loader = VecLoader::new(vec![
            Feature::new(f64::NAN, 10.0),
            Feature::new(10.0, 10.0).with_attribute("v", "1"),
            Feature::new(95.0, 10.0),
        ]);
        let mut store = MemoryStore::new();

        let report = quantizer.ingest(&mut loader, &mut store).unwrap();
        assert_eq!(report.features_processed, 1);
        assert_eq!(report.features_skipped, 2);
        let indices: Vec<usize> = report.skipped.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(store.staged().unwrap().len(), 1);
    }

    #[test]
    fn test_ingest_rejects_stale_staging() {
        let quantizer = Quantizer::new(Config::default()).unwrap();
        let mut store = MemoryStore::new();
        store
            .stage(&[StagedFeature::from(&Feature::new(0.0, 0.0))])
            .unwrap();

        let mut loader = VecLoader::new(vec![Feature::new(1.0, 1.0)]);
        assert!(matches!(
            quantizer.ingest(&mut loader, &mut store),
            Err(QuantError::Store(_))
        ));
        assert!(store.rows().unwrap().is_empty());
    }
}
