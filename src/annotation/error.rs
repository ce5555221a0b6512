/// Errors that can occur while loading or reshaping annotation tables
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// I/O error reading an annotation table
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Missing required column in the annotation table
    #[error("Missing required annotation column: {0}")]
    MissingColumn(String),

    /// A numeric column held a value that could not be parsed
    #[error("Invalid value {value:?} in column {column} (row {row})")]
    InvalidValue {
        /// Column name
        column: String,
        /// 1-based data row
        row: usize,
        /// Offending text
        value: String,
    },

    /// A row carried neither a formula nor an ion value
    #[error("Annotation row {row} has no formula or ion")]
    MissingIdentity {
        /// 1-based data row
        row: usize,
    },

    /// An ion string had an empty formula part
    #[error("Invalid ion: {0:?}")]
    InvalidIon(String),
}
