//! CSV loading.
//!
//! The first record is the header; every following record keeps its raw
//! cells so that structural checks can see ragged lines, while rules and
//! normalization work on header-keyed [`Row`]s.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::ReaderBuilder;
use nyher_model::{Dialect, Row};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Reader options derived from a resource dialect.
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub skip_initial_space: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_initial_space: false,
        }
    }
}

impl CsvOptions {
    pub fn from_dialect(dialect: &Dialect) -> Self {
        Self {
            delimiter: dialect.delimiter_byte().unwrap_or(b','),
            skip_initial_space: dialect.skip_initial_space,
        }
    }
}

/// One physical data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    /// Row number, counting the header as row 1.
    pub number: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CsvTable {
    pub path: PathBuf,
    pub headers: Arc<[String]>,
    pub records: Vec<CsvRecord>,
}

impl CsvTable {
    /// Header-keyed rows, built on demand.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.records.iter().map(|record| {
            let values = record
                .cells
                .iter()
                .take(self.headers.len())
                .cloned()
                .map(Some)
                .collect();
            Row::new(record.number, Arc::clone(&self.headers), values)
        })
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// File name component of the source path, for findings.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str, options: CsvOptions) -> String {
    if options.skip_initial_space {
        raw.trim_start().to_string()
    } else {
        raw.to_string()
    }
}

pub fn read_csv_table(path: &Path, options: CsvOptions) -> Result<CsvTable> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_path(path)
        .map_err(|source| csv_error(path, source))?;

    let mut records = reader.records();
    let headers: Arc<[String]> = match records.next() {
        Some(header) => header
            .map_err(|source| csv_error(path, source))?
            .iter()
            .map(normalize_header)
            .collect(),
        None => {
            return Err(IngestError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
    };

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record.map_err(|source| csv_error(path, source))?;
        rows.push(CsvRecord {
            number: idx + 2,
            cells: record
                .iter()
                .map(|cell| normalize_cell(cell, options))
                .collect(),
        });
    }
    debug!(
        path = %path.display(),
        fields = headers.len(),
        rows = rows.len(),
        "read csv table"
    );
    Ok(CsvTable {
        path: path.to_path_buf(),
        headers,
        records: rows,
    })
}

fn csv_error(path: &Path, source: csv::Error) -> IngestError {
    match source.kind() {
        csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        }
        _ => IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        },
    }
}
