use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use mzspot::aggregate::aggregate;
use mzspot::matcher::{match_targets, read_targets_file, Report};

use super::inputs::{RunArgs, RunSettings};

/// Aggregate, match targets and write all output files
pub fn run(args: RunArgs, targets: Option<PathBuf>) -> Result<()> {
    let settings = RunSettings::resolve(args, targets)?;
    let targets_path = settings
        .targets
        .clone()
        .context("No target list given (--targets or inputs.targets)")?;

    info!("mzspot - Spot Report");
    info!("====================");
    info!("Dataset:  {}", settings.naming.dataset_id);
    info!("FDR:      {}", settings.naming.fdr);
    info!("Database: {}", settings.naming.database);
    info!("Targets:  {}", targets_path.display());
    info!("Output:   {}", settings.out.display());

    let targets = read_targets_file(&targets_path)
        .with_context(|| format!("Failed to read targets {}", targets_path.display()))?;
    let inputs = settings.load()?;

    let table = aggregate(
        &inputs.mask,
        &inputs.region_names,
        &inputs.images,
        settings.policy,
    )
    .context("Aggregation failed")?;

    let report = match_targets(&targets, &table).context("Target matching failed")?;

    let summary = settings
        .exporter()
        .export_all(&settings.out, &table, &report)
        .context("Failed to write report")?;

    print_summary(&report);
    println!("{}", summary);
    Ok(())
}

fn print_summary(report: &Report) {
    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        println!("{}", style("Spot Report").bold().cyan());
        for row in &report.rows {
            let ion = match &row.matched {
                Some(key) => style(key.ion()).green(),
                None => style("-".to_string()).red(),
            };
            println!(
                "  {:<6} {:<24} {:<16} sum={:<12.4} occupancy={:.1}%",
                row.target.well, row.target.molecule, ion, row.stats.sum, row.stats.occupancy
            );
        }
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("Spot Report");
        for row in &report.rows {
            let ion = row.matched.as_ref().map(|k| k.ion()).unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<6} {:<24} {:<16} sum={:<12.4} occupancy={:.1}%",
                row.target.well, row.target.molecule, ion, row.stats.sum, row.stats.occupancy
            );
        }
    }

    println!("{}", report);
}
