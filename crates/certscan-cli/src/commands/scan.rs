//! Scan command - filter certificate scan files

use anyhow::{bail, Context, Result};
use certscan_core::pipeline::RunReport;
use certscan_core::{Config, Pipeline};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Scan command arguments
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Preset to start from (strict, all, dv, ov, ev, untrusted)
    #[arg(short = 'p', long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// Keep record if it has no alt names
    #[arg(long)]
    pub noaltname: bool,

    /// Keep record if it has no organization
    #[arg(long)]
    pub noorg: bool,

    /// Keep record if the certificate is not valid
    #[arg(long)]
    pub novalid: bool,

    /// Keep record if no browser root store trusts it
    #[arg(long)]
    pub nobrowservalid: bool,

    /// Keep record if it is not CA-signed (self-signed)
    #[arg(long)]
    pub nocasigned: bool,

    /// Only keep records whose policy matches ('DV', 'OV', 'EV' or an OID)
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Output file for kept records (CSV)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write bulk database load files
    #[arg(long)]
    pub bulk: bool,

    /// Directory for bulk load files
    #[arg(long, value_name = "DIR")]
    pub spool_dir: Option<PathBuf>,

    /// Records per bulk load batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Also load the CA policy table into the database
    #[arg(long)]
    pub load_policies: bool,

    /// Files processed in parallel (0 = one per CPU)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Malformed lines tolerated per file
    #[arg(long, value_name = "N")]
    pub max_bad_lines: Option<usize>,

    /// Public suffix list
    #[arg(long, value_name = "FILE")]
    pub suffix_list: Option<PathBuf>,

    /// CA policy OID table
    #[arg(long, value_name = "FILE")]
    pub policy_table: Option<PathBuf>,

    /// Log every normalized record (needs -v)
    #[arg(long)]
    pub dump: bool,

    /// Input scan files (CSV, 44 fields per line)
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
}

impl ScanArgs {
    /// Resolve the base configuration and apply command-line overrides
    pub fn to_config(&self) -> Result<Config> {
        let mut config = super::config::resolve(self.config.as_deref(), self.preset.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    /// Flags can only relax the filter; options replace config values
    fn apply(&self, config: &mut Config) {
        let keep = &mut config.keep;
        keep.keep_without_alt_names |= self.noaltname;
        keep.keep_without_organization |= self.noorg;
        keep.keep_invalid |= self.novalid;
        keep.keep_browser_untrusted |= self.nobrowservalid;
        keep.keep_self_signed |= self.nocasigned;
        if let Some(policy) = &self.policy {
            keep.policy = Some(policy.clone());
        }

        if let Some(path) = &self.output {
            config.output.path = Some(path.clone());
        }

        config.bulk.enabled |= self.bulk;
        config.bulk.load_policies |= self.load_policies;
        if let Some(dir) = &self.spool_dir {
            config.bulk.spool_dir = dir.clone();
        }
        if let Some(size) = self.batch_size {
            config.bulk.batch_size = size;
        }

        if let Some(jobs) = self.jobs {
            config.pipeline.jobs = jobs;
        }
        if let Some(limit) = self.max_bad_lines {
            config.pipeline.max_bad_lines = limit;
        }
        config.pipeline.dump_records |= self.dump;

        if let Some(path) = &self.suffix_list {
            config.data.suffix_list = path.clone();
        }
        if let Some(path) = &self.policy_table {
            config.data.policy_table = path.clone();
        }
    }
}

/// Execute scan command
pub fn execute(args: ScanArgs) -> Result<()> {
    if args.inputs.is_empty() {
        bail!("No input files given (try --help)");
    }

    let config = args.to_config()?;
    config.validate().context("Invalid configuration")?;

    let pipeline = Pipeline::from_config(&config).context("Failed to initialize")?;
    if pipeline.sink_names().is_empty() {
        warn!("No output configured; kept records are only counted");
    }

    let jobs = config.pipeline.effective_jobs();
    info!(files = args.inputs.len(), jobs, "Starting scan");

    let started = Instant::now();
    let result = pipeline.run(&args.inputs, jobs);
    // Flush whatever was kept even when a file aborted the run
    let finished = pipeline.finish();

    let report = result.context("Scan aborted")?;
    finished.context("Failed to flush output")?;

    print_summary(&report, started.elapsed());
    Ok(())
}

fn print_summary(report: &RunReport, elapsed: Duration) {
    println!();
    println!("{}", "Record counts:".bold());
    if report.files.len() > 1 {
        for file in &report.files {
            println!("  {}  {}", file.path.display().to_string().cyan(), file.tallies);
        }
    }

    let totals = &report.totals;
    println!("  In:        {:>12}", totals.input);
    println!("  Out:       {:>12}", totals.output.to_string().green());
    println!("  Err:       {:>12}", totals.errors.to_string().yellow());
    println!("  Discarded: {:>12}", totals.discarded);
    if totals.rescued > 0 {
        println!("  Rescued:   {:>12}", totals.rescued);
    }
    if let Some(pct) = totals.percent_kept() {
        println!("  {:.2}% kept.", pct);
    }

    for file in report.files.iter().filter(|f| f.bad_lines > 0) {
        println!(
            "  {} {} bad line(s) skipped in {}",
            "!".yellow(),
            file.bad_lines,
            file.path.display()
        );
    }
    println!("  Finished in {:.2?}", elapsed);
}
