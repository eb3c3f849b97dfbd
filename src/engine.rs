//! Engine: loads the importing and master tables, groups them by identity key
//! and runs reconciliation through a caller-supplied resolver.
//!
//! Typical usage:
//!
//! ```no_run
//! use pwreconcile::engine::Engine;
//! use pwreconcile::reconcile::{Disposition, FixedResolver};
//! # fn main() -> anyhow::Result<()> {
//! let mut engine = Engine::new();
//! engine.load_from_file_paths("/path/to/importing.csv", "/path/to/master.csv")?;
//! let result = engine.reconcile(&mut FixedResolver(Disposition::KeepBoth))?;
//! pwreconcile::export::save_records(&result.records, "/path/to/merged.csv")?;
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::index::{Index, group_by_key};
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, load_records};
use crate::reconcile::{Reconciliation, Resolver, reconcile};
use crate::record::KeyEncoding;
use crate::stats::{RunStats, calculate_statistics};
use crate::table::parse_table_contents;

#[derive(Debug, Default)]
pub struct Engine {
    pub encoding: KeyEncoding,
    pub importing: Index,
    pub master: Index,
}

impl Engine {
    /// Create an engine with empty indexes and the default `|`-joined keys.
    pub fn new() -> Self {
        Self::with_encoding(KeyEncoding::default())
    }

    pub fn with_encoding(encoding: KeyEncoding) -> Self {
        Self {
            encoding,
            importing: Index::new(),
            master: Index::new(),
        }
    }

    /// Load both tables from in-memory text. Intended for tests and small
    /// programmatic integrations.
    pub fn load_from_strings(&mut self, importing: &str, master: &str) -> Result<()> {
        let imp = parse_table_contents(importing).context("importing table")?;
        let mas = parse_table_contents(master).context("master table")?;
        self.importing = group_by_key(&imp, self.encoding);
        self.master = group_by_key(&mas, self.encoding);
        Ok(())
    }

    pub fn load_from_file_paths_with_threshold<P: AsRef<Path>>(
        &mut self,
        importing: P,
        master: P,
        mmap_threshold_bytes: u64,
    ) -> Result<()> {
        self.importing = self.load_index(importing.as_ref(), mmap_threshold_bytes)?;
        self.master = self.load_index(master.as_ref(), mmap_threshold_bytes)?;
        Ok(())
    }

    /// Convenience wrapper that uses the default mmap threshold.
    pub fn load_from_file_paths<P: AsRef<Path>>(&mut self, importing: P, master: P) -> Result<()> {
        self.load_from_file_paths_with_threshold(importing, master, DEFAULT_MMAP_THRESHOLD_BYTES)
    }

    fn load_index(&self, path: &Path, threshold: u64) -> Result<Index> {
        info!("reading {}", path.display());
        let records = load_records(path, threshold)?;
        let index = Index::from_records(records, self.encoding);
        info!(
            "{}: {} records under {} keys",
            path.display(),
            index.record_count(),
            index.len()
        );
        Ok(index)
    }

    pub fn reconcile<R: Resolver + ?Sized>(&self, resolver: &mut R) -> Result<Reconciliation> {
        reconcile(&self.importing, &self.master, resolver).context("conflict resolution")
    }

    pub fn statistics(&self, result: &Reconciliation) -> RunStats {
        calculate_statistics(&self.importing, &self.master, result)
    }
}
