use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod aggregate;
mod annotations;
mod config;
mod demo;
mod inputs;
mod report;

use annotations::AnnotationArgs;
use inputs::RunArgs;

/// mzspot - Spot-wise analysis of imaging mass spectrometry annotations
#[derive(Parser)]
#[command(name = "mzspot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate ion images per well, match targets and write all reports
    Report {
        #[command(flatten)]
        run: RunArgs,

        /// Target list: well, molecule name, formula (no header)
        #[arg(short, long, value_name = "FILE")]
        targets: Option<PathBuf>,
    },

    /// Aggregate ion images per well and write the statistic tables only
    Aggregate {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Filter, de-duplicate or merge an annotation table
    Annotations(AnnotationArgs),

    /// Generate a synthetic plate dataset for trying out the pipeline
    Demo {
        /// Output directory
        #[arg(value_name = "OUTPUT", default_value = "mzspot_demo")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Report { run, targets } => report::run(run, targets),
        Commands::Aggregate { run } => aggregate::run(run),
        Commands::Annotations(args) => annotations::run(args),
        Commands::Demo { output } => demo::run(output),
    }
}
