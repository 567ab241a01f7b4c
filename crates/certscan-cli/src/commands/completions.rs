//! Shell completions generator

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{generate, generate_to, Shell};
use std::io;
use std::path::PathBuf;

use crate::args::Args as CliArgs;

const BIN_NAME: &str = "certscan";

/// Completions command arguments
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script into this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Execute completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = CliArgs::command();

    match args.dir {
        Some(dir) => {
            let path = generate_to(args.shell, &mut cmd, BIN_NAME, &dir)
                .with_context(|| format!("Failed to write completions to {:?}", dir))?;
            println!("Completions written to {}", path.display());
        }
        None => generate(args.shell, &mut cmd, BIN_NAME, &mut io::stdout()),
    }

    Ok(())
}
