//! Writes a reconciled record table to disk.
//!
//! The destination is replaced in a single step: rows are written to a
//! temporary file beside it, which is then renamed over the destination. An
//! empty result writes nothing and reports [`Outcome::NothingToWrite`].
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use tempfile::NamedTempFile;

use crate::record::{FIELDS, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { path: PathBuf, records: usize },
    NothingToWrite,
}

/// Header plus one row per record, fields in [`FIELDS`] order.
pub fn write_records<W: Write>(records: &[Record], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(FIELDS)?;
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_records<P: AsRef<Path>>(records: &[Record], path: P) -> Result<Outcome> {
    let path = path.as_ref();
    if records.is_empty() {
        return Ok(Outcome::NothingToWrite);
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temporary file in {}", dir.display()))?;
    write_records(records, tmp.as_file_mut())
        .with_context(|| format!("write {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(Outcome::Written {
        path: path.to_path_buf(),
        records: records.len(),
    })
}
