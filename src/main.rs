//! # mzspot
//!
//! Command-line front end for spot-wise analysis of imaging MS annotations.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a demo plate and run the full report on it
//! mzspot demo plate_demo
//! mzspot -v report --config plate_demo/run.toml
//!
//! # Statistics only, from explicit inputs
//! mzspot aggregate --grid grid_params.json --mask grid_mask.tsv \
//!     --images images.csv --out stats/
//!
//! # Annotation table helpers
//! mzspot annotations results.csv --fdr 0.1 --merge-adducts -o merged.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
