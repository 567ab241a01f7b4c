//! Config command - configuration management

use anyhow::{bail, Context, Result};
use certscan_core::{Config, Preset};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_FILE: &str = "certscan.toml";

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Config file to show (default: search paths)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Preset to show
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// Generate a configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = CONFIG_FILE)]
        output: PathBuf,

        /// Preset to use as base
        #[arg(short, long, default_value = "strict")]
        preset: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// List the available presets
    Presets,

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show { file, preset } => show_config(file, preset),
        ConfigAction::Generate {
            output,
            preset,
            force,
        } => generate_config(output, preset, force),
        ConfigAction::Validate { file } => validate_config(file),
        ConfigAction::Presets => list_presets(),
        ConfigAction::Paths => show_paths(),
    }
}

/// Build the base configuration for a command.
///
/// An explicit file wins over a preset; with neither, the first file found
/// on the search paths is used, else the strict preset.
pub fn resolve(file: Option<&Path>, preset: Option<&str>) -> Result<Config> {
    if let Some(path) = file {
        return Config::load(path).with_context(|| format!("Failed to load config from {:?}", path));
    }
    if let Some(name) = preset {
        let preset = Preset::from_name(name).with_context(|| format!("Unknown preset: {}", name))?;
        return Ok(Config::from_preset(preset));
    }
    match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "Using config file");
            Config::load(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => Ok(Config::from_preset(Preset::Strict)),
    }
}

fn show_config(file: Option<PathBuf>, preset: Option<String>) -> Result<()> {
    let config = resolve(file.as_deref(), preset.as_deref())?;
    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

fn generate_config(output: PathBuf, preset_name: String, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let preset = Preset::from_name(&preset_name)
        .with_context(|| format!("Unknown preset: {}", preset_name))?;
    let toml_str = Config::from_preset(preset)
        .to_toml()
        .context("Failed to serialize config")?;

    let content = format!(
        "# certscan configuration\n\
         # Generated from preset: {} ({})\n\n\
         {}",
        preset.name(),
        preset.description(),
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    info!("Generated config file: {:?}", output);
    println!("Configuration file generated: {}", output.display());
    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load config from {:?}", file))?;
    config.validate().context("Configuration validation failed")?;

    let keep = &config.keep;
    println!("{} Configuration is valid", "✓".green());
    println!(
        "  Preset: {}",
        config.preset.map_or("(none)", |p| p.name())
    );
    println!("  Keep without alt names: {}", keep.keep_without_alt_names);
    println!("  Keep without organization: {}", keep.keep_without_organization);
    println!("  Keep invalid: {}", keep.keep_invalid);
    println!("  Keep browser-untrusted: {}", keep.keep_browser_untrusted);
    println!("  Keep self-signed: {}", keep.keep_self_signed);
    println!(
        "  Required policy: {}",
        keep.policy.as_deref().unwrap_or("(any)")
    );
    if config.bulk.enabled {
        println!("  Bulk spool: {}", config.bulk.spool_dir.display());
    }

    Ok(())
}

fn list_presets() -> Result<()> {
    for preset in Preset::ALL {
        println!("  {:<10} {}", preset.name().bold(), preset.description());
    }
    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();
    for (i, path) in search_paths().iter().enumerate() {
        let marker = if path.exists() { " (found)".green().to_string() } else { String::new() };
        println!("  {}. {}{}", i + 1, path.display(), marker);
    }
    Ok(())
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "certscan") {
        paths.push(dirs.config_dir().join("config.toml"));
    }
    paths
}

fn find_config_file() -> Option<PathBuf> {
    search_paths().into_iter().find(|path| path.exists())
}
