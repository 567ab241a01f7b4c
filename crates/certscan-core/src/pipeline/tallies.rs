//! Run accounting

use std::fmt;
use std::path::PathBuf;

/// Record counters.
///
/// Every record read counts once in `input` and then once in either
/// `output` or `discarded`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tallies {
    /// Records read
    pub input: u64,
    /// Records written to the sinks
    pub output: u64,
    /// Records kept with an error annotation
    pub errors: u64,
    /// Records dropped by the decision engine
    pub discarded: u64,
    /// Records kept only by the multi-domain rescue
    pub rescued: u64,
}

impl Tallies {
    /// Add another set of counters
    pub fn merge(&mut self, other: &Tallies) {
        self.input += other.input;
        self.output += other.output;
        self.errors += other.errors;
        self.discarded += other.discarded;
        self.rescued += other.rescued;
    }

    /// `100 * output / input`, or `None` before any input
    pub fn percent_kept(&self) -> Option<f64> {
        (self.input > 0).then(|| 100.0 * self.output as f64 / self.input as f64)
    }

    /// True if `input == output + discarded`
    pub fn is_balanced(&self) -> bool {
        self.input == self.output + self.discarded
    }
}

impl fmt::Display for Tallies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "In: {}  Out: {}  Err: {}  Discarded: {}",
            self.input, self.output, self.errors, self.discarded
        )?;
        if let Some(pct) = self.percent_kept() {
            write!(f, "  Kept: {pct:.2}%")?;
        }
        Ok(())
    }
}

/// Result of processing one input file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Input file
    pub path: PathBuf,
    /// Rows the transport rejected
    pub bad_lines: usize,
    /// Counters for this file
    pub tallies: Tallies,
}

impl FileReport {
    /// Empty report for a file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bad_lines: 0,
            tallies: Tallies::default(),
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Per-file reports, in input order
    pub files: Vec<FileReport>,
    /// Sum over all files
    pub totals: Tallies,
}

impl RunReport {
    /// Add a file report to the totals
    pub fn push(&mut self, report: FileReport) {
        self.totals.merge(&report.tallies);
        self.files.push(report);
    }

    /// Bad lines over all files
    pub fn bad_lines(&self) -> usize {
        self.files.iter().map(|f| f.bad_lines).sum()
    }
}
