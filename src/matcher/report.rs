use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::RegionStats;
use crate::annotation::IonKey;

use super::Target;

/// Best annotation found for one target in its well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// The target this row reports on
    pub target: Target,

    /// Ion whose statistics were selected, `None` if nothing matched
    pub matched: Option<IonKey>,

    /// Statistics of the matched ion in the target's well, all zero when
    /// nothing matched
    pub stats: RegionStats,
}

impl ReportRow {
    /// Row for a target without any matching annotation
    pub fn unmatched(target: Target) -> Self {
        Self {
            target,
            matched: None,
            stats: RegionStats::ZERO,
        }
    }
}

/// One row per target, in target list order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Report rows
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Number of targets with a matching annotation
    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.matched.is_some()).count()
    }

    /// Targets without any matching annotation
    pub fn unmatched(&self) -> impl Iterator<Item = &Target> {
        self.rows
            .iter()
            .filter(|r| r.matched.is_none())
            .map(|r| &r.target)
    }

    /// Find the row for a `(well, formula, molecule)` triple
    pub fn get(&self, well: &str, formula: &str, molecule: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| {
            r.target.well == well && r.target.formula == formula && r.target.molecule == molecule
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Report: {} targets, {} matched, {} without annotation",
            self.rows.len(),
            self.matched_count(),
            self.rows.len() - self.matched_count()
        )
    }
}
