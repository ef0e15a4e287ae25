mod config;
mod input;
mod pass;
mod report;
mod sample;
mod session;
mod stats;

use crate::session::Session;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// File to save the pass report to.
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prompt for the sequence on stdin.
    Prompt,

    /// Use the given values as the sequence.
    Run {
        #[arg(allow_negative_numbers = true)]
        vals: Vec<f64>,
    },

    /// Use a randomly generated sequence.
    Generate {
        #[arg(long)]
        len: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a saved report.
    Inspect {
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let session = Session::new(args.config.as_deref(), args.report)
        .context("failed to construct session")?;

    match args.command {
        Command::Prompt => session.run_prompt()?,
        Command::Run { vals } => session.run_vals(vals)?,
        Command::Generate { len, seed } => session.run_generated(len, seed)?,
        Command::Inspect { file } => session.inspect_report(file)?,
    }

    Ok(())
}
