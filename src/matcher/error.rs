/// Errors that can occur while loading targets or matching them
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// I/O error reading the target list
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error in the target list
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A target row does not have the three positional columns
    #[error("Target list line {line}: expected well, molecule and formula, found {found} columns")]
    MalformedTarget {
        /// 1-based line number
        line: usize,
        /// Number of columns found
        found: usize,
    },

    /// A target names a well that is not part of the region statistics
    #[error("Target {molecule} refers to well {well}, which is not in the region grid")]
    MissingRegion {
        /// Well named by the target
        well: String,
        /// Molecule of the offending target
        molecule: String,
    },
}
