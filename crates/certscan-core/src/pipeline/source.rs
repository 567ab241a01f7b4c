//! Record sources

use crate::error::Result;
use crate::record::{RawRecord, FIELD_COUNT};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Why a source could not produce a record
#[derive(Error, Debug)]
pub enum SourceError {
    /// The row could not be decoded; the source can continue
    #[error("Malformed row at line {line}: {message}")]
    Malformed {
        /// 1-based line number, 0 if unknown
        line: u64,
        /// Decoder message
        message: String,
    },

    /// The underlying reader failed; the source cannot continue
    #[error("Read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies raw records one at a time
pub trait RecordSource {
    /// Next record, or `Ok(None)` at end of input
    fn read_record(&mut self) -> std::result::Result<Option<RawRecord>, SourceError>;
}

/// Reads scan dump rows from CSV
pub struct CsvRecordSource<R> {
    reader: csv::Reader<R>,
    row: csv::StringRecord,
}

impl CsvRecordSource<File> {
    /// Open a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_reader(File::open(path)?))
    }
}

impl<R: Read> CsvRecordSource<R> {
    /// Read CSV rows from any reader
    pub fn from_reader(reader: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self {
            reader,
            row: csv::StringRecord::new(),
        }
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn read_record(&mut self) -> std::result::Result<Option<RawRecord>, SourceError> {
        match self.reader.read_record(&mut self.row) {
            Ok(false) => Ok(None),
            Ok(true) => {
                let line = self.row.position().map_or(0, csv::Position::line);
                let mut fields: Vec<String> = self.row.iter().map(str::to_string).collect();
                // Some dumps end every row with a comma
                if fields.len() == FIELD_COUNT + 1 && fields.last().map_or(false, String::is_empty) {
                    fields.pop();
                }
                if fields.len() != FIELD_COUNT {
                    return Err(SourceError::Malformed {
                        line,
                        message: format!("{} fields, expected {FIELD_COUNT}", fields.len()),
                    });
                }
                Ok(Some(RawRecord::new(fields)))
            }
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                let message = e.to_string();
                match e.into_kind() {
                    csv::ErrorKind::Io(err) => Err(SourceError::Io(err)),
                    _ => Err(SourceError::Malformed { line, message }),
                }
            }
        }
    }
}
