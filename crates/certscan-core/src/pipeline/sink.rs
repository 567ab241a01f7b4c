//! Record sinks

use crate::error::{Error, Result};
use crate::record::{NormalizedCert, RawRecord};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Receives kept records.
///
/// `cert` is `None` when the record could not be normalized or decided and
/// is being kept with an error annotation.
pub trait RecordSink: Send {
    /// Sink name for logs and errors
    fn name(&self) -> &str;

    /// Append one record
    fn write_record(&mut self, raw: &RawRecord, cert: Option<&NormalizedCert>) -> Result<()>;

    /// Flush everything still buffered
    fn finish(&mut self) -> Result<()>;
}

/// Writes kept raw rows back out as CSV
pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvRecordSink<File> {
    /// Create or truncate an output file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::sink(path.display().to_string(), e.to_string()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvRecordSink<W> {
    /// Write CSV to any writer
    pub fn from_writer(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        Self { writer }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::sink("csv", e.error().to_string()))
    }
}

impl<W: Write + Send> RecordSink for CsvRecordSink<W> {
    fn name(&self) -> &str {
        "csv"
    }

    fn write_record(&mut self, raw: &RawRecord, _cert: Option<&NormalizedCert>) -> Result<()> {
        self.writer
            .write_record(raw.fields())
            .map_err(|e| Error::sink("csv", e.to_string()))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::sink("csv", e.to_string()))
    }
}
