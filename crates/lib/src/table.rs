//! # CSV Tables
//!
//! Reading the input table and writing the enriched output incrementally.
//! The output file is created with a header on the first append and only
//! appended to afterwards, so a crash mid-run keeps every finished batch.

use crate::errors::TableError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// An in-memory table read from a CSV file with a header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Reads a whole CSV file. A leading UTF-8 BOM is ignored.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!(
            "Read {} rows with columns {:?} from '{}'",
            table.rows.len(),
            table.headers,
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        if headers.is_empty() {
            return Err(TableError::NoHeaders);
        }
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serializes the header plus the given rows back to CSV text.
    pub fn to_csv_string(&self, rows: &[Vec<String>]) -> Result<String, TableError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| TableError::Io {
                path: "<memory>".to_string(),
                source: e.into_error(),
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Writes rows to a CSV file one batch at a time.
#[derive(Debug)]
pub struct IncrementalCsvWriter {
    path: PathBuf,
    headers: Vec<String>,
    write_bom: bool,
    started: bool,
    rows_written: usize,
}

impl IncrementalCsvWriter {
    pub fn new(path: impl Into<PathBuf>, headers: Vec<String>, write_bom: bool) -> Self {
        Self {
            path: path.into(),
            headers,
            write_bom,
            started: false,
            rows_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Creates (or truncates) the file and writes the header, if not done yet.
    pub fn ensure_started(&mut self) -> Result<(), TableError> {
        if self.started {
            return Ok(());
        }
        let mut file = File::create(&self.path).map_err(|source| self.io_error(source))?;
        if self.write_bom {
            file.write_all(UTF8_BOM).map_err(|source| self.io_error(source))?;
        }
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&self.headers)?;
        writer.flush().map_err(|source| self.io_error(source))?;
        self.started = true;
        debug!("Created '{}' with header", self.path.display());
        Ok(())
    }

    /// Appends a batch of rows and flushes them to disk before returning.
    pub fn append(&mut self, rows: &[Vec<String>]) -> Result<(), TableError> {
        self.ensure_started()?;
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        let mut writer = csv::Writer::from_writer(file);
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|source| self.io_error(source))?;
        self.rows_written += rows.len();
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> TableError {
        TableError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
