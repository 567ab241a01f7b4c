//! Lookup data commands: domain, suffixes, policies

use anyhow::{Context, Result};
use certscan_core::{Config, DomainParts, PolicyClass, PolicyRegistry, SuffixSet};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

/// Where to find the lookup data
#[derive(Args, Debug, Default)]
pub struct DataArgs {
    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Public suffix list (overrides config)
    #[arg(long, value_name = "FILE")]
    pub suffix_list: Option<PathBuf>,

    /// CA policy OID table (overrides config)
    #[arg(long, value_name = "FILE")]
    pub policy_table: Option<PathBuf>,
}

impl DataArgs {
    /// Base configuration with the data path overrides applied
    pub fn resolve(&self) -> Result<Config> {
        let mut config = super::config::resolve(self.config.as_deref(), None)?;
        if let Some(path) = &self.suffix_list {
            config.data.suffix_list = path.clone();
        }
        if let Some(path) = &self.policy_table {
            config.data.policy_table = path.clone();
        }
        Ok(config)
    }

    fn load_suffixes(&self) -> Result<SuffixSet> {
        let config = self.resolve()?;
        SuffixSet::load(&config.data.suffix_list).context("Failed to load public suffix list")
    }

    fn load_registry(&self) -> Result<PolicyRegistry> {
        let config = self.resolve()?;
        PolicyRegistry::load(&config.data.policy_table).context("Failed to load CA policy table")
    }
}

/// Domain command arguments
#[derive(Args, Debug)]
pub struct DomainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Domain names to split
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Print how each name splits around its public suffix
pub fn domain(args: DomainArgs) -> Result<()> {
    let suffixes = args.data.load_suffixes()?;

    for name in &args.names {
        print_parts(name, &suffixes.decompose(name));
    }

    if let [a, b] = args.names.as_slice() {
        let (same, both_matched) = suffixes.same_second_level(a, b);
        let verdict = match (same, both_matched) {
            (true, true) => "same registrable domain".green(),
            (_, false) => "not comparable".yellow(),
            (false, true) => "different registrable domains".red(),
        };
        println!("{} vs {}: {}", a, b, verdict);
    }

    Ok(())
}

fn print_parts(name: &str, parts: &DomainParts) {
    println!("{}", name.bold());
    match parts.registrable() {
        Some(registrable) => {
            println!("  suffix:       {}", parts.suffix);
            println!("  second level: {}", parts.second_level);
            if !parts.subdomain.is_empty() {
                println!("  subdomain:    {}", parts.subdomain);
            }
            println!("  registrable:  {}", registrable.green());
        }
        None => println!("  {}", "no public suffix".yellow()),
    }
}

/// Print every ICANN suffix, one per line
pub fn suffixes(args: DataArgs) -> Result<()> {
    let suffixes = args.load_suffixes()?;
    for suffix in suffixes.suffixes() {
        println!("{}", suffix);
    }
    info!(count = suffixes.len(), "Listed public suffixes");
    Ok(())
}

/// Print the policy table as `oid  class  issuer`
pub fn policies(args: DataArgs) -> Result<()> {
    let registry = args.load_registry()?;
    for (oid, info) in registry.entries() {
        let class = match info.class {
            PolicyClass::Ev => info.class.as_str().green(),
            PolicyClass::Ov => info.class.as_str().cyan(),
            PolicyClass::Dv => info.class.as_str().normal(),
        };
        println!("{:<32} {}  {}", oid, class, info.issuer);
    }
    info!(count = registry.len(), "Listed CA policy OIDs");
    Ok(())
}
