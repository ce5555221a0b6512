use crate::annotation::IonKey;

/// Errors that can occur during region aggregation
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// An ion image does not have the shape of the region mask
    #[error("Image for {key} has shape {found:?}, region mask has shape {expected:?}")]
    ShapeMismatch {
        /// Offending ion
        key: IonKey,
        /// Mask `(height, width)`
        expected: (usize, usize),
        /// Image `(height, width)`
        found: (usize, usize),
    },

    /// A region label has no pixels (only under [`EmptyRegionPolicy::Fail`])
    ///
    /// [`EmptyRegionPolicy::Fail`]: super::EmptyRegionPolicy::Fail
    #[error("Region {region} (label {label}) contains no pixels")]
    EmptyRegion {
        /// Region name
        region: String,
        /// Region label value
        label: usize,
    },

    /// The same region name appears twice
    #[error("Duplicate region name: {0}")]
    DuplicateRegion(String),

    /// A statistics row does not have one entry per region
    #[error("Statistics row for {key} has {found} entries, table has {expected} regions")]
    RowLength {
        /// Offending ion
        key: IonKey,
        /// Number of regions in the table
        expected: usize,
        /// Entries supplied
        found: usize,
    },

    /// A statistics row disagrees with earlier rows on a region's pixel count
    #[error("Statistics row for {key} has {found} pixels in region {region}, earlier rows have {expected}")]
    PixelCountMismatch {
        /// Offending ion
        key: IonKey,
        /// Region name
        region: String,
        /// Pixel count of earlier rows
        expected: usize,
        /// Pixel count supplied
        found: usize,
    },
}
