use anyhow::{Context, Result};
use log::info;

use mzspot::aggregate::aggregate;

use super::inputs::{RunArgs, RunSettings};

/// Compute region statistics and write the per-statistic tables
pub fn run(args: RunArgs) -> Result<()> {
    let settings = RunSettings::resolve(args, None)?;

    info!("mzspot - Region Aggregation");
    info!("===========================");
    info!("Grid:   {}", settings.grid.display());
    info!("Images: {}", settings.images.display());
    info!("Output: {}", settings.out.display());

    let inputs = settings.load()?;
    let table = aggregate(
        &inputs.mask,
        &inputs.region_names,
        &inputs.images,
        settings.policy,
    )
    .context("Aggregation failed")?;

    let summary = settings
        .exporter()
        .export_statistics(&settings.out, &table)
        .context("Failed to write statistics")?;

    println!("{}", table);
    println!("{}", summary);
    Ok(())
}
