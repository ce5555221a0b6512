/// Errors that can occur while writing reports
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Arrow error while building record batches
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error while writing the statistics file
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),
}
