use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::record::Record;
use crate::table::{TableError, read_table};

/// Threshold in bytes above which we attempt to use mmap for reading.
/// Callers can override via API; this is a reasonable default.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

/// Decide whether to use mmap based on file size and threshold.
pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

/// Confirm `path` names a regular file that can be opened.
pub fn check_source<P: AsRef<Path>>(path: P) -> Result<(), SourceError> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_file() {
        return Err(SourceError::Unreadable {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    File::open(path).map_err(|e| SourceError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Open `path` for reading, memory-mapping it when it is at least
/// `threshold_bytes` long.
pub fn open_source<P: AsRef<Path>>(
    path: P,
    threshold_bytes: u64,
) -> Result<Box<dyn Read>, SourceError> {
    let path = path.as_ref();
    let unreadable = |source| SourceError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    check_source(path)?;
    let file = File::open(path).map_err(unreadable)?;
    let len = file.metadata().map_err(unreadable)?.len();
    if should_use_mmap(len, threshold_bytes) {
        let mmap = unsafe { Mmap::map(&file) }.map_err(unreadable)?;
        Ok(Box::new(Cursor::new(mmap)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Load every record from the table at `path`.
pub fn load_records<P: AsRef<Path>>(
    path: P,
    threshold_bytes: u64,
) -> Result<Vec<Record>, SourceError> {
    let path = path.as_ref();
    let reader = open_source(path, threshold_bytes)?;
    read_table(reader).map_err(|source| SourceError::Table {
        path: path.to_path_buf(),
        source,
    })
}
