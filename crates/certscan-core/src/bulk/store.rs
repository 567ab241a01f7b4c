//! Batch stores

use super::sql::FIELD_OPTIONS;
use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the generated load script inside a spool directory
pub const LOAD_SCRIPT: &str = "load.sql";

/// Destination for complete batches of formatted lines.
///
/// A load either takes the whole batch or fails; a failed batch may be
/// offered again.
pub trait BatchStore: Send {
    /// Load one batch into `table`
    fn load(&mut self, table: &str, lines: &[String]) -> Result<()>;
}

/// Writes each batch to a numbered data file and appends the matching
/// `LOAD DATA LOCAL INFILE` statement to `load.sql`.
#[derive(Debug)]
pub struct SpoolStore {
    dir: PathBuf,
    next_batch: u64,
}

impl SpoolStore {
    /// Use `dir` as the spool directory, creating it if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::sink(dir.display().to_string(), e.to_string()))?;
        Ok(Self { dir, next_batch: 1 })
    }

    /// Spool directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the load script
    pub fn script_path(&self) -> PathBuf {
        self.dir.join(LOAD_SCRIPT)
    }

    fn write_batch(&self, table: &str, lines: &[String]) -> std::io::Result<PathBuf> {
        let name = format!("{table}-{:06}.txt", self.next_batch);
        let partial = self.dir.join(format!(".{name}.partial"));
        let target = self.dir.join(name);

        {
            let mut file = std::io::BufWriter::new(fs::File::create(&partial)?);
            for line in lines {
                file.write_all(line.as_bytes())?;
            }
            file.flush()?;
        }
        fs::rename(&partial, &target)?;

        let mut script = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.script_path())?;
        writeln!(
            script,
            "LOAD DATA LOCAL INFILE '{}' INTO TABLE {table} {FIELD_OPTIONS};",
            target.display()
        )?;
        Ok(target)
    }
}

impl BatchStore for SpoolStore {
    fn load(&mut self, table: &str, lines: &[String]) -> Result<()> {
        let path = self
            .write_batch(table, lines)
            .map_err(|e| Error::sink(table, e.to_string()))?;
        debug!(table, records = lines.len(), path = %path.display(), "Spooled batch");
        self.next_batch += 1;
        Ok(())
    }
}
