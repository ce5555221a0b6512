use std::path::Path;

use crate::image::{read_matrix_file, ImageError};

use super::GridError;

/// Label value painted on pixels outside every spot
pub const BACKGROUND_LABEL: i64 = -1;

/// Integer-labeled pixel grid. Label `v` marks pixels of region `v`;
/// anything outside `0..n_regions` is background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMask {
    height: usize,
    width: usize,
    labels: Vec<i64>,
}

impl RegionMask {
    /// Create a mask, validating the buffer length against the shape
    pub fn new(height: usize, width: usize, labels: Vec<i64>) -> Result<Self, GridError> {
        if labels.len() != height * width {
            return Err(GridError::BufferLength {
                height,
                width,
                found: labels.len(),
            });
        }
        Ok(Self {
            height,
            width,
            labels,
        })
    }

    /// Mask of the given shape with every pixel set to background
    pub fn background(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            labels: vec![BACKGROUND_LABEL; height * width],
        }
    }

    /// Build a mask from nested rows; all rows must share one width
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ImageError::RaggedMatrix {
                row,
                expected: width,
                found: values.len(),
            }
            .into());
        }
        Self::new(height, width, rows.concat())
    }

    /// Load a mask from a delimited integer matrix file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let matrix = read_matrix_file::<i64, _>(path)?;
        Self::new(matrix.height, matrix.width, matrix.values)
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Flattened row-major labels
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Flat indices of pixels carrying `label`
    pub fn pixel_indices(&self, label: i64) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Flat pixel indices for every label in `0..n_regions`, gathered in a
    /// single pass. Entry `v` lists the pixels of region `v` in ascending
    /// order.
    pub fn region_indices(&self, n_regions: usize) -> Vec<Vec<usize>> {
        let mut regions = vec![Vec::new(); n_regions];
        for (idx, &label) in self.labels.iter().enumerate() {
            if let Ok(label) = usize::try_from(label) {
                if let Some(region) = regions.get_mut(label) {
                    region.push(idx);
                }
            }
        }
        regions
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, label: i64) {
        self.labels[row * self.width + col] = label;
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> i64 {
        self.labels[row * self.width + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_mask() -> RegionMask {
        RegionMask::from_rows(&[vec![0, 0, 1], vec![0, 1, 1]]).unwrap()
    }

    #[test]
    fn test_pixel_indices() {
        let mask = example_mask();
        assert_eq!(mask.pixel_indices(0), vec![0, 1, 3]);
        assert_eq!(mask.pixel_indices(1), vec![2, 4, 5]);
        assert!(mask.pixel_indices(7).is_empty());
    }

    #[test]
    fn test_region_indices_ignores_background() {
        let mask = RegionMask::from_rows(&[vec![0, -1, 2], vec![5, 1, 1]]).unwrap();
        let regions = mask.region_indices(3);
        assert_eq!(regions, vec![vec![0], vec![4, 5], vec![2]]);
    }

    #[test]
    fn test_region_indices_agree_with_pixel_indices() {
        let mask = example_mask();
        let regions = mask.region_indices(2);
        for (label, indices) in regions.iter().enumerate() {
            assert_eq!(indices, &mask.pixel_indices(label as i64));
        }
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = RegionMask::from_rows(&[vec![0, 0, 1], vec![0, 1]]);
        assert!(matches!(
            result,
            Err(GridError::MatrixError(ImageError::RaggedMatrix { row: 1, found: 2, .. }))
        ));
    }
}
