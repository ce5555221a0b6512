//! # Report Export Module
//!
//! Writes the results of a run to an output directory:
//!
//! ```text
//! out/
//! ├── {stem}_sum.csv                # ion x well tables, one per statistic
//! ├── {stem}_mean.csv
//! ├── {stem}_std.csv
//! ├── {stem}_occupancy.csv
//! ├── {stem}_report.csv             # best annotation per target
//! └── {stem}_statistics.parquet     # long format, optional
//! ```
//!
//! where `{stem}` is `{dataset_id}_fdr{fdr}_{database}` (see [`ReportNaming`]).

mod columnar;
mod error;
mod naming;
mod tables;


pub use columnar::{
    columns, footer_metadata, statistics_schema, write_statistics_parquet,
    write_statistics_parquet_file, ParquetExportConfig, KEY_CREATED, KEY_DATABASE,
    KEY_DATASET_ID, KEY_FDR, KEY_SOFTWARE,
};
pub use error::ExportError;
pub use naming::ReportNaming;
pub use tables::{write_report, write_statistic_table, REPORT_HEADER};

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::info;

use crate::aggregate::{RegionStatisticsTable, Statistic};
use crate::matcher::Report;

/// Writes every output file of a run into one directory
#[derive(Debug, Clone)]
pub struct ReportExporter {
    naming: ReportNaming,
    parquet: Option<ParquetExportConfig>,
}

impl ReportExporter {
    /// Exporter writing CSV tables only
    pub fn new(naming: ReportNaming) -> Self {
        Self {
            naming,
            parquet: None,
        }
    }

    /// Also write the long-format Parquet statistics file
    pub fn with_parquet(mut self, config: ParquetExportConfig) -> Self {
        self.parquet = Some(config);
        self
    }

    /// Naming scheme in use
    pub fn naming(&self) -> &ReportNaming {
        &self.naming
    }

    /// Write the per-statistic tables (and the Parquet file if enabled)
    pub fn export_statistics(
        &self,
        dir: &Path,
        table: &RegionStatisticsTable,
    ) -> Result<ExportSummary, ExportError> {
        fs::create_dir_all(dir)?;
        let mut summary = ExportSummary::default();

        for statistic in Statistic::ALL {
            let path = self.naming.statistic_path(dir, statistic);
            let file = BufWriter::new(File::create(&path)?);
            write_statistic_table(table, statistic, file)?;
            info!("Wrote {} table to {}", statistic, path.display());
            summary.files.push(path);
        }

        if let Some(config) = &self.parquet {
            let path = self.naming.parquet_path(dir);
            let rows = write_statistics_parquet_file(&path, table, &self.naming, config)?;
            info!("Wrote {} statistics rows to {}", rows, path.display());
            summary.files.push(path);
        }

        summary.ions = table.ion_count();
        summary.regions = table.regions().len();
        Ok(summary)
    }

    /// Write the combined target report
    pub fn export_report(&self, dir: &Path, report: &Report) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = self.naming.report_path(dir);
        let file = BufWriter::new(File::create(&path)?);
        write_report(report, file)?;
        info!("Wrote report for {} targets to {}", report.rows.len(), path.display());
        Ok(path)
    }

    /// Write statistics and report
    pub fn export_all(
        &self,
        dir: &Path,
        table: &RegionStatisticsTable,
        report: &Report,
    ) -> Result<ExportSummary, ExportError> {
        let mut summary = self.export_statistics(dir, table)?;
        summary.files.push(self.export_report(dir, report)?);
        summary.targets = report.rows.len();
        summary.matched_targets = report.matched_count();
        Ok(summary)
    }
}

/// Files and counts from a completed export
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Paths written, in write order
    pub files: Vec<PathBuf>,
    /// Ions in the statistics tables
    pub ions: usize,
    /// Regions in the statistics tables
    pub regions: usize,
    /// Targets in the report
    pub targets: usize,
    /// Targets with a matching annotation
    pub matched_targets: usize,
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} files: {} ions x {} regions, {}/{} targets matched",
            self.files.len(),
            self.ions,
            self.regions,
            self.matched_targets,
            self.targets
        )
    }
}
