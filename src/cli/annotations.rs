use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use mzspot::annotation::AnnotationTable;

/// Options of the `annotations` command
#[derive(clap::Args, Debug)]
pub struct AnnotationArgs {
    /// Annotation table CSV
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Keep annotations at or below this FDR level
    #[arg(long)]
    pub fdr: Option<f64>,

    /// Merge all adducts of a formula into one entry
    #[arg(long)]
    pub merge_adducts: bool,

    /// Keep only formulas listed in this file (one per line)
    #[arg(long, value_name = "FILE")]
    pub formulas: Option<PathBuf>,

    /// Write the resulting table here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Filter and collapse an annotation table
pub fn run(args: AnnotationArgs) -> Result<()> {
    let mut table = AnnotationTable::from_csv_file(&args.input)
        .with_context(|| format!("Failed to read annotations {}", args.input.display()))?;
    info!("Read {} annotations from {}", table.len(), args.input.display());

    if let Some(fdr) = args.fdr {
        table = table.filter_by_fdr(fdr);
        info!("{} annotations at FDR <= {}", table.len(), fdr);
    }

    table = if args.merge_adducts {
        table.merge_adducts()
    } else {
        table.dedup_by_ion()
    };

    if let Some(path) = &args.formulas {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read formula list {}", path.display()))?;
        let formulas: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        table = table.filter_by_formulas(&formulas);
        info!("{} annotations after formula filter", table.len());
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            table.write_csv(BufWriter::new(file))?;
            println!("Wrote {} annotations to {}", table.len(), path.display());
        }
        None => table.write_csv(io::stdout().lock())?,
    }

    Ok(())
}
