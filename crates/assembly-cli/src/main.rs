//! # Assembly
//!
//! Command line front end for the Assembly production planner.
//!
//! Loads a recipe dataset once, builds the index and answers one planning
//! query per invocation, printing JSON to stdout. Logs go to stderr.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use assembly_common::PlannerError;
use assembly_planner::{Dataset, RecipeIndex};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::Query;
use crate::config::PlannerConfig;

/// Exit status for a target item no recipe produces.
const EXIT_NOT_FOUND: u8 = 2;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "assembly")]
#[command(about = "Production planning over crafting-game recipe data")]
#[command(version)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Dataset file, overriding the config
    #[arg(short, long, value_name = "PATH", global = true)]
    dataset: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long, global = true)]
    compact: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Query(Query),

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let args = Args::parse();

    let (mut config, config_error) = args
        .config
        .as_ref()
        .map_or_else(PlannerConfig::load, PlannerConfig::load_from);
    config.validate();
    if let Some(dataset) = &args.dataset {
        config.dataset_path.clone_from(dataset);
    }
    if args.compact {
        config.pretty_json = false;
    }

    if let Err(e) = init_tracing(&config, args.verbose, args.log_json) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match config_error {
        Some(e) => warn!("{e}; using defaults"),
        None => debug!("Using config: {:?}", config),
    }

    let result = match &args.command {
        Command::Query(query) => run(query, &config),
        Command::Config { save } => show_config(&config, args.config.as_deref(), *save),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            if e.downcast_ref::<PlannerError>().is_some() {
                ExitCode::from(EXIT_NOT_FOUND)
            } else {
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing(config: &PlannerConfig, verbose: bool, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_new("assembly=debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?
    };

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();
    Ok(())
}

fn show_config(config: &PlannerConfig, path: Option<&Path>, save: bool) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    if save {
        let path = path.map_or_else(PlannerConfig::config_path, Path::to_path_buf);
        config
            .save_to(&path)
            .with_context(|| format!("saving {}", path.display()))?;
    }
    Ok(())
}

fn run(query: &Query, config: &PlannerConfig) -> Result<()> {
    info!("Assembly {}", env!("CARGO_PKG_VERSION"));

    let dataset = Dataset::load(&config.dataset_path)
        .with_context(|| format!("loading {}", config.dataset_path.display()))?;
    let index = RecipeIndex::from_dataset(dataset);

    commands::run(query, &index, config)
}
