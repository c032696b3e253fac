//! Store abstraction for staged features and output rows.
//!
//! The quantizer never talks to a store while it aggregates. A store receives
//! the flat staging records before the core runs and the assembled rows after
//! it finishes, and drops the staging data on cleanup.

use crate::error::{QuantError, Result};
use dggs_types::feature::StagedFeature;
use dggs_types::row::OutputRow;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the staging table inside a [`JsonLinesStore`] directory.
pub const STAGING_FILE: &str = "raw_features.jsonl";

/// File name of the output table inside a [`JsonLinesStore`] directory.
pub const OUTPUT_FILE: &str = "grid_cells.jsonl";

/// Trait for store implementations
pub trait Store: Send {
    /// Append flat staging records
    fn stage(&mut self, features: &[StagedFeature]) -> Result<()>;

    /// Read back all staged records, in staging order
    fn staged(&self) -> Result<Vec<StagedFeature>>;

    /// Append assembled output rows
    fn write_rows(&mut self, rows: &[OutputRow]) -> Result<()>;

    /// Read back all output rows
    fn rows(&self) -> Result<Vec<OutputRow>>;

    /// Drop staged data
    fn cleanup(&mut self) -> Result<()>;

    /// Flush any pending writes to persistent storage
    fn sync(&mut self) -> Result<()>;

    /// Get store statistics
    fn stats(&self) -> Result<StoreStats>;
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Currently staged records
    pub staged_count: usize,
    /// Output rows written
    pub row_count: usize,
    /// Number of operations performed
    pub operations_count: u64,
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    staged: Vec<StagedFeature>,
    rows: Vec<OutputRow>,
    operations_count: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn stage(&mut self, features: &[StagedFeature]) -> Result<()> {
        self.staged.extend_from_slice(features);
        self.operations_count += 1;
        Ok(())
    }

    fn staged(&self) -> Result<Vec<StagedFeature>> {
        Ok(self.staged.clone())
    }

    fn write_rows(&mut self, rows: &[OutputRow]) -> Result<()> {
        self.rows.extend_from_slice(rows);
        self.operations_count += 1;
        Ok(())
    }

    fn rows(&self) -> Result<Vec<OutputRow>> {
        Ok(self.rows.clone())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.staged.clear();
        self.operations_count += 1;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        // No-op for in-memory storage
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            staged_count: self.staged.len(),
            row_count: self.rows.len(),
            operations_count: self.operations_count,
        })
    }
}

/// Directory-backed store writing one JSON object per line.
///
/// Staged features go to [`STAGING_FILE`], output rows to [`OUTPUT_FILE`].
/// Both use the dotted nested-column names, so the output file can be bulk
/// loaded as JSONEachRow.
#[derive(Debug)]
pub struct JsonLinesStore {
    dir: PathBuf,
    operations_count: u64,
}

impl JsonLinesStore {
    /// Open a store directory, keeping existing contents.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            operations_count: 0,
        })
    }

    /// Open a store directory and truncate any previous staging and output.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let store = Self::open(dir)?;
        File::create(store.staging_path())?;
        File::create(store.output_path())?;
        Ok(store)
    }

    pub fn staging_path(&self) -> PathBuf {
        self.dir.join(STAGING_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE)
    }

    fn append<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| {
                QuantError::Store(format!(
                    "{}:{}: {}",
                    path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn count_lines(path: &Path) -> Result<usize> {
        match File::open(path) {
            Ok(file) => {
                let mut count = 0;
                for line in BufReader::new(file).lines() {
                    if !line?.trim().is_empty() {
                        count += 1;
                    }
                }
                Ok(count)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl Store for JsonLinesStore {
    fn stage(&mut self, features: &[StagedFeature]) -> Result<()> {
        Self::append(&self.staging_path(), features)?;
        self.operations_count += 1;
        Ok(())
    }

    fn staged(&self) -> Result<Vec<StagedFeature>> {
        Self::read_all(&self.staging_path())
    }

    fn write_rows(&mut self, rows: &[OutputRow]) -> Result<()> {
        Self::append(&self.output_path(), rows)?;
        self.operations_count += 1;
        Ok(())
    }

    fn rows(&self) -> Result<Vec<OutputRow>> {
        Self::read_all(&self.output_path())
    }

    fn cleanup(&mut self) -> Result<()> {
        match std::fs::remove_file(self.staging_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.operations_count += 1;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        for path in [self.staging_path(), self.output_path()] {
            if path.exists() {
                File::open(&path)?.sync_all()?;
            }
        }
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            staged_count: Self::count_lines(&self.staging_path())?,
            row_count: Self::count_lines(&self.output_path())?,
            operations_count: self.operations_count,
        })
    }
}
