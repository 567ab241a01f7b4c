//! Per-table batching

use super::store::BatchStore;
use crate::error::Result;
use tracing::info;

/// Default records per batch
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Collects lines for one table and hands them to a store in batches.
///
/// A batch is cleared and counted only after the store accepted it.
#[derive(Debug)]
pub struct BulkLoader {
    table: String,
    batch_size: usize,
    pending: Vec<String>,
    loaded: u64,
    batches: u64,
}

impl BulkLoader {
    /// Loader for `table`; a batch size of 0 is treated as 1
    pub fn new(table: impl Into<String>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            table: table.into(),
            batch_size,
            pending: Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE)),
            loaded: 0,
            batches: 0,
        }
    }

    /// Target table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Queue a line, loading the current batch first if it is full
    pub fn write<S: BatchStore + ?Sized>(&mut self, line: String, store: &mut S) -> Result<()> {
        if self.pending.len() >= self.batch_size {
            self.flush(store)?;
        }
        self.pending.push(line);
        Ok(())
    }

    /// Load whatever is pending
    pub fn flush<S: BatchStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        store.load(&self.table, &self.pending)?;
        self.loaded += self.pending.len() as u64;
        self.batches += 1;
        self.pending.clear();
        Ok(())
    }

    /// Flush the remainder and report totals
    pub fn close<S: BatchStore + ?Sized>(&mut self, store: &mut S) -> Result<u64> {
        self.flush(store)?;
        info!(table = %self.table, records = self.loaded, batches = self.batches, "Bulk load complete");
        Ok(self.loaded)
    }

    /// Lines queued but not yet loaded
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Lines successfully loaded
    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    /// Batches successfully loaded
    pub fn batches(&self) -> u64 {
        self.batches
    }
}
