use std::path::PathBuf;

use crate::annotation::IonKey;

/// Errors that can occur while loading intensity images
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// I/O error reading a matrix or manifest
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A matrix cell could not be parsed as a number
    #[error("Invalid value {value:?} at row {row}, column {column}")]
    InvalidValue {
        /// 0-based row
        row: usize,
        /// 0-based column
        column: usize,
        /// Offending text
        value: String,
    },

    /// Matrix rows do not all have the same width
    #[error("Ragged matrix: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        /// 0-based row
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of the offending row
        found: usize,
    },

    /// Pixel buffer length disagrees with the declared shape
    #[error("Pixel buffer has {found} values, shape {height}x{width} needs {}", .height * .width)]
    BufferLength {
        /// Declared rows
        height: usize,
        /// Declared columns
        width: usize,
        /// Actual buffer length
        found: usize,
    },

    /// Two manifest entries name the same ion
    #[error("Duplicate image for ion {0}")]
    DuplicateIon(IonKey),

    /// Manifest is missing a required column
    #[error("Missing required manifest column: {0}")]
    MissingColumn(String),

    /// Error while reading a specific file
    #[error("{path}: {source}")]
    File {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: Box<ImageError>,
    },
}
