//! Record processing pipeline
//!
//! Streams raw rows through normalization and the decision engine into the
//! configured sinks. Rows that fail normalization or evaluation are kept
//! with an annotation rather than dropped. Malformed transport rows are
//! skipped up to a per-file limit.

mod sink;
mod source;
mod tallies;

pub use sink::{CsvRecordSink, RecordSink};
pub use source::{CsvRecordSource, RecordSource, SourceError};
pub use tallies::{FileReport, RunReport, Tallies};

use crate::bulk::{load_policy_table, BulkSink, SpoolStore};
use crate::config::Config;
use crate::domain::SuffixSet;
use crate::error::{Error, Result};
use crate::filter::{Decision, DecisionEngine};
use crate::policy::PolicyRegistry;
use crate::record::{Field, NormalizedCert, RawRecord};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info, instrument, warn};

/// Default number of malformed rows tolerated per file
pub const DEFAULT_MAX_BAD_LINES: usize = 100;

/// Certificate record pipeline.
///
/// The suffix set, policy registry and engine are read-only once built.
/// Sinks are shared behind one lock so rows from parallel files never
/// interleave.
pub struct Pipeline {
    suffixes: SuffixSet,
    registry: PolicyRegistry,
    engine: DecisionEngine,
    sinks: Mutex<Vec<Box<dyn RecordSink>>>,
    max_bad_lines: usize,
    dump_records: bool,
}

impl Pipeline {
    /// Create a pipeline with no sinks
    pub fn new(suffixes: SuffixSet, registry: PolicyRegistry, engine: DecisionEngine) -> Self {
        Self {
            suffixes,
            registry,
            engine,
            sinks: Mutex::new(Vec::new()),
            max_bad_lines: DEFAULT_MAX_BAD_LINES,
            dump_records: false,
        }
    }

    /// Load the lookup data, build the engine and open the sinks a
    /// configuration asks for
    pub fn from_config(config: &Config) -> Result<Self> {
        let suffixes = SuffixSet::load(&config.data.suffix_list)?;
        let registry = PolicyRegistry::load(&config.data.policy_table)?;
        let engine = DecisionEngine::from_policy(&config.keep);

        let mut pipeline = Self::new(suffixes, registry, engine)
            .with_max_bad_lines(config.pipeline.max_bad_lines)
            .with_dump_records(config.pipeline.dump_records);

        if let Some(path) = &config.output.path {
            pipeline.add_sink(CsvRecordSink::create(path)?);
        }
        if config.bulk.enabled {
            let mut store = SpoolStore::new(&config.bulk.spool_dir)?;
            if config.bulk.load_policies {
                load_policy_table(&pipeline.registry, &mut store, config.bulk.batch_size)?;
            }
            pipeline.add_sink(BulkSink::new(store, config.bulk.batch_size));
        }

        info!(
            checks = ?pipeline.engine.check_names(),
            sinks = ?pipeline.sink_names(),
            "Pipeline ready"
        );
        Ok(pipeline)
    }

    /// Set the per-file malformed row limit
    pub fn with_max_bad_lines(mut self, limit: usize) -> Self {
        self.max_bad_lines = limit;
        self
    }

    /// Log every normalized record at debug level
    pub fn with_dump_records(mut self, dump: bool) -> Self {
        self.dump_records = dump;
        self
    }

    /// Add an output sink
    pub fn add_sink<S: RecordSink + 'static>(&mut self, sink: S) {
        self.sinks.get_mut().push(Box::new(sink));
    }

    /// Names of the configured sinks
    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.lock().iter().map(|s| s.name().to_string()).collect()
    }

    /// Suffix set in use
    pub fn suffixes(&self) -> &SuffixSet {
        &self.suffixes
    }

    /// Policy registry in use
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Decision engine in use
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Push one raw record through normalize, decide and emit.
    ///
    /// Only sink failures are returned; record-level failures are annotated
    /// into the row and it is kept.
    pub fn process_record(&self, raw: RawRecord, tallies: &mut Tallies) -> Result<()> {
        tallies.input += 1;

        let evaluated = NormalizedCert::from_record(&raw, &self.suffixes).and_then(|cert| {
            let decision = self.engine.should_keep(&cert, &self.registry)?;
            Ok((cert, decision))
        });

        match evaluated {
            Ok((cert, decision)) => {
                if self.dump_records {
                    debug!(id = %cert.certificate_id, "Normalized record\n{cert}");
                }
                match decision {
                    Decision::Discard { check } => {
                        debug!(id = %cert.certificate_id, check, "Discarded");
                        tallies.discarded += 1;
                        return Ok(());
                    }
                    Decision::KeepMultiDomain => tallies.rescued += 1,
                    Decision::Keep => {}
                }
                self.emit(&raw, Some(&cert))?;
            }
            Err(e) if e.is_record_level() => {
                let mut raw = raw;
                warn!(id = %raw.get(Field::CertificateId), error = %e, "Keeping flagged record");
                raw.set_error(&e.to_string());
                self.emit(&raw, None)?;
                tallies.errors += 1;
            }
            Err(e) => return Err(e),
        }

        tallies.output += 1;
        Ok(())
    }

    fn emit(&self, raw: &RawRecord, cert: Option<&NormalizedCert>) -> Result<()> {
        let mut sinks = self.sinks.lock();
        for sink in sinks.iter_mut() {
            sink.write_record(raw, cert).map_err(|e| match e {
                Error::Sink { .. } => e,
                other => Error::sink(sink.name(), other.to_string()),
            })?;
        }
        Ok(())
    }

    /// Drain a source.
    ///
    /// Aborts once the number of malformed rows exceeds the limit, or on a
    /// read failure.
    #[instrument(skip(self, source), fields(path = %path.display()))]
    pub fn process_source(&self, source: &mut dyn RecordSource, path: &Path) -> Result<FileReport> {
        let mut report = FileReport::new(path);

        loop {
            match source.read_record() {
                Ok(Some(raw)) => self.process_record(raw, &mut report.tallies)?,
                Ok(None) => break,
                Err(SourceError::Malformed { line, message }) => {
                    report.bad_lines += 1;
                    warn!(line, %message, "Skipping malformed row");
                    if report.bad_lines > self.max_bad_lines {
                        return Err(Error::TooManyBadLines {
                            path: path.to_path_buf(),
                            count: report.bad_lines,
                            limit: self.max_bad_lines,
                        });
                    }
                }
                Err(SourceError::Io(e)) => return Err(Error::Io(e)),
            }
        }

        info!(
            bad_lines = report.bad_lines,
            input = report.tallies.input,
            output = report.tallies.output,
            "Finished file"
        );
        Ok(report)
    }

    /// Open and process one CSV file
    pub fn process_file(&self, path: &Path) -> Result<FileReport> {
        let mut source = CsvRecordSource::from_path(path)?;
        self.process_source(&mut source, path)
    }

    /// Process files, `jobs` at a time.
    ///
    /// With one job files are processed strictly in order. Reports come
    /// back in input order either way. The first failing file stops the run.
    pub fn run(&self, paths: &[PathBuf], jobs: usize) -> Result<RunReport> {
        let mut run = RunReport::default();

        if jobs <= 1 || paths.len() <= 1 {
            for path in paths {
                run.push(self.process_file(path)?);
            }
            return Ok(run);
        }

        let next = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let results: Mutex<Vec<(usize, Result<FileReport>)>> = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for _ in 0..jobs.min(paths.len()) {
                scope.spawn(|| {
                    while !failed.load(Ordering::Relaxed) {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(path) = paths.get(index) else {
                            break;
                        };
                        let result = self.process_file(path);
                        if result.is_err() {
                            failed.store(true, Ordering::Relaxed);
                        }
                        results.lock().push((index, result));
                    }
                });
            }
        });

        let mut results = results.into_inner();
        results.sort_by_key(|(index, _)| *index);
        for (_, result) in results {
            run.push(result?);
        }
        Ok(run)
    }

    /// Flush every sink
    pub fn finish(&self) -> Result<()> {
        let mut sinks = self.sinks.lock();
        for sink in sinks.iter_mut() {
            sink.finish()?;
            debug!(sink = sink.name(), "Sink finished");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("suffixes", &self.suffixes.len())
            .field("policies", &self.registry.len())
            .field("engine", &self.engine)
            .field("sinks", &self.sink_names())
            .field("max_bad_lines", &self.max_bad_lines)
            .finish()
    }
}
