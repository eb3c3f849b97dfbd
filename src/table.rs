//! Delimited table parsing: a header row naming the five record fields in
//! any order, then one row per record. Extra columns are ignored.
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::record::{FIELDS, Record};

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("header is missing required field '{0}'")]
    MissingHeader(&'static str),
    #[error("line {line}: missing field '{field}'")]
    MissingField { line: u64, field: &'static str },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Column index of each entry of [`FIELDS`] within the source header.
fn locate_columns(headers: &StringRecord) -> Result<[usize; 5], TableError> {
    let mut cols = [0usize; 5];
    for (slot, field) in cols.iter_mut().zip(FIELDS) {
        *slot = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == field)
            .ok_or(TableError::MissingHeader(field))?;
    }
    Ok(cols)
}

fn record_from_row(row: &StringRecord, cols: &[usize; 5]) -> Result<Record, TableError> {
    let line = row.position().map(|p| p.line()).unwrap_or(0);
    let mut values: [String; 5] = Default::default();
    for ((value, &col), field) in values.iter_mut().zip(cols).zip(FIELDS) {
        *value = row
            .get(col)
            .ok_or(TableError::MissingField { line, field })?
            .to_string();
    }
    let [name, url, username, password, note] = values;
    Ok(Record {
        name,
        url,
        username,
        password,
        note,
    })
}

/// Read every record from `reader`. A source with no header at all (empty
/// input) yields an empty table.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<Record>, TableError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let cols = locate_columns(&headers)?;
    let mut records = Vec::new();
    let mut row = StringRecord::new();
    while rdr.read_record(&mut row)? {
        records.push(record_from_row(&row, &cols)?);
    }
    Ok(records)
}

pub fn parse_table_contents(contents: &str) -> Result<Vec<Record>, TableError> {
    read_table(contents.as_bytes())
}
