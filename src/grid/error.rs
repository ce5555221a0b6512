use crate::image::ImageError;

/// Errors that can occur while loading a region mask or grid layout
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// I/O error reading a grid file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading the mask matrix
    #[error("Mask error: {0}")]
    MatrixError(#[from] ImageError),

    /// JSON deserialization error in the grid parameters
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Label buffer length disagrees with the declared shape
    #[error("Label buffer has {found} values, shape {height}x{width} needs {}", .height * .width)]
    BufferLength {
        /// Declared rows
        height: usize,
        /// Declared columns
        width: usize,
        /// Actual buffer length
        found: usize,
    },

    /// Number of region names differs from the number of spots
    #[error("Grid has {spots} spots but {names} region names")]
    NameCountMismatch {
        /// Spot positions in the layout
        spots: usize,
        /// Names supplied
        names: usize,
    },

    /// The same region name is used twice
    #[error("Duplicate region name: {0}")]
    DuplicateName(String),
}
