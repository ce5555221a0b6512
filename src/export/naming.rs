use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::Statistic;

/// Identifies a run in output file names:
/// `{dataset_id}_fdr{fdr}_{database}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNaming {
    /// Dataset identifier at the annotation service
    pub dataset_id: String,

    /// FDR level the annotations were retrieved at
    pub fdr: f64,

    /// Molecular database used for annotation
    pub database: String,
}

impl ReportNaming {
    /// Create a naming scheme
    pub fn new(dataset_id: impl Into<String>, fdr: f64, database: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            fdr,
            database: database.into(),
        }
    }

    /// Common file name stem. Path separators are replaced by `_`.
    pub fn stem(&self) -> String {
        format!(
            "{}_fdr{}_{}",
            sanitize(&self.dataset_id),
            self.fdr,
            sanitize(&self.database)
        )
    }

    /// Path of the wide CSV table for one statistic
    pub fn statistic_path(&self, dir: &Path, statistic: Statistic) -> PathBuf {
        dir.join(format!("{}_{}.csv", self.stem(), statistic.name()))
    }

    /// Path of the combined target report
    pub fn report_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_report.csv", self.stem()))
    }

    /// Path of the long-format Parquet statistics file
    pub fn parquet_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_statistics.parquet", self.stem()))
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_convention() {
        let naming = ReportNaming::new("2020-03-12_17h55m21s", 0.5, "SwissLipids-2018-02-02");
        assert_eq!(naming.stem(), "2020-03-12_17h55m21s_fdr0.5_SwissLipids-2018-02-02");

        let dir = Path::new("out");
        assert_eq!(
            naming.statistic_path(dir, Statistic::Occupancy),
            dir.join("2020-03-12_17h55m21s_fdr0.5_SwissLipids-2018-02-02_occupancy.csv")
        );
        assert_eq!(
            naming.report_path(dir),
            dir.join("2020-03-12_17h55m21s_fdr0.5_SwissLipids-2018-02-02_report.csv")
        );
    }

    #[test]
    fn test_separators_replaced() {
        let naming = ReportNaming::new("lab/run:1", 0.1, "HMDB\\v4");
        assert_eq!(naming.stem(), "lab_run_1_fdr0.1_HMDB_v4");
    }
}
