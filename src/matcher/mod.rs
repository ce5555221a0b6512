//! # Target Matching Module
//!
//! Links molecules of interest to the region statistics of the well they
//! were spotted into.
//!
//! For each [`Target`], candidate ions are those whose base formula (the
//! formula up to the first `+` or `-`) equals the target's formula. The
//! candidate with the largest sum in the target's well wins; on equal sums
//! the first candidate in ion key order is kept. Targets without any
//! candidate report all-zero statistics.

mod error;
mod report;
mod target;

pub use error::MatchError;
pub use report::{Report, ReportRow};
pub use target::{read_targets, read_targets_file, Target};

use log::{debug, info};

use crate::aggregate::RegionStatisticsTable;

/// Select the best-matching ion for every target.
///
/// Every target's well must be a region of `table`; otherwise the whole
/// match fails with [`MatchError::MissingRegion`].
pub fn match_targets(
    targets: &[Target],
    table: &RegionStatisticsTable,
) -> Result<Report, MatchError> {
    if let Some(target) = targets.iter().find(|t| !table.has_region(&t.well)) {
        return Err(MatchError::MissingRegion {
            well: target.well.clone(),
            molecule: target.molecule.clone(),
        });
    }

    let rows: Vec<ReportRow> = targets.iter().map(|t| best_match(t, table)).collect();
    let report = Report { rows };

    for target in report.unmatched() {
        debug!(
            "No annotation for {} ({}) in well {}",
            target.molecule, target.formula, target.well
        );
    }
    info!("{}", report);
    Ok(report)
}

fn best_match(target: &Target, table: &RegionStatisticsTable) -> ReportRow {
    table
        .ions()
        .filter(|key| key.base_formula() == target.formula)
        .filter_map(|key| table.get(key, &target.well).map(|stats| (key, stats)))
        .fold(ReportRow::unmatched(target.clone()), |best, (key, stats)| {
            if stats.sum > best.stats.sum {
                ReportRow {
                    target: best.target,
                    matched: Some(key.clone()),
                    stats: *stats,
                }
            } else {
                best
            }
        })
}
