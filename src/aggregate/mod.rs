//! # Region Aggregation Module
//!
//! Summarises every ion image inside every labeled region of a
//! [`RegionMask`]: sum, mean, population standard deviation and percent
//! occupancy (share of strictly positive pixels).
//!
//! ## Usage
//!
//! ```rust
//! use mzspot::aggregate::{aggregate, EmptyRegionPolicy};
//! use mzspot::annotation::IonKey;
//! use mzspot::grid::RegionMask;
//! use mzspot::image::{ImageStack, IntensityImage};
//!
//! let mask = RegionMask::from_rows(&[vec![0, 0, 1], vec![0, 1, 1]])?;
//! let mut images = ImageStack::new();
//! images.insert(
//!     IonKey::new("C6H12O6", "+"),
//!     IntensityImage::from_rows(&[vec![2.0, 0.0, 5.0], vec![0.0, 3.0, 4.0]])?,
//! )?;
//!
//! let names = vec!["A".to_string(), "B".to_string()];
//! let table = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan)?;
//! let b = table.get(&IonKey::new("C6H12O6", "+"), "B").unwrap();
//! assert_eq!(b.sum, 12.0);
//! assert_eq!(b.occupancy, 100.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Pixels whose label lies outside `0..region_names.len()` are ignored.
//! With the `parallel` feature ions are summarised on the rayon pool; the
//! result is identical to the sequential path.

mod error;
mod stats;
mod table;


pub use error::AggregateError;
pub use stats::{EmptyRegionPolicy, RegionStats, Statistic};
pub use table::RegionStatisticsTable;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::annotation::IonKey;
use crate::grid::RegionMask;
use crate::image::{ImageStack, IntensityImage};

/// Compute statistics for every ion image in every named region.
///
/// `region_names[v]` names the pixels labeled `v`. Fails on the first image
/// whose shape differs from the mask, and on empty regions when `policy` is
/// [`EmptyRegionPolicy::Fail`].
pub fn aggregate(
    mask: &RegionMask,
    region_names: &[String],
    images: &ImageStack,
    policy: EmptyRegionPolicy,
) -> Result<RegionStatisticsTable, AggregateError> {
    let mut table = RegionStatisticsTable::new(region_names.to_vec())?;

    for (key, image) in images.iter() {
        if image.shape() != mask.shape() {
            return Err(AggregateError::ShapeMismatch {
                key: key.clone(),
                expected: mask.shape(),
                found: image.shape(),
            });
        }
    }

    let regions = mask.region_indices(region_names.len());
    for (label, (name, indices)) in region_names.iter().zip(&regions).enumerate() {
        if indices.is_empty() {
            match policy {
                EmptyRegionPolicy::Fail => {
                    return Err(AggregateError::EmptyRegion {
                        region: name.clone(),
                        label,
                    })
                }
                EmptyRegionPolicy::Nan => {
                    warn!("Region {} (label {}) contains no pixels", name, label)
                }
            }
        } else {
            debug!("Region {}: {} pixels", name, indices.len());
        }
    }

    for (key, row) in summarise(images, &regions) {
        table.insert(key, row)?;
    }
    table.set_region_sizes(regions.iter().map(Vec::len).collect());

    info!("{}", table);
    Ok(table)
}

fn summarise_image(image: &IntensityImage, regions: &[Vec<usize>]) -> Vec<RegionStats> {
    regions
        .iter()
        .map(|indices| RegionStats::from_indices(image.pixels(), indices))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn summarise(images: &ImageStack, regions: &[Vec<usize>]) -> Vec<(IonKey, Vec<RegionStats>)> {
    images
        .iter()
        .map(|(key, image)| (key.clone(), summarise_image(image, regions)))
        .collect()
}

#[cfg(feature = "parallel")]
fn summarise(images: &ImageStack, regions: &[Vec<usize>]) -> Vec<(IonKey, Vec<RegionStats>)> {
    let entries: Vec<(&IonKey, &IntensityImage)> = images.iter().collect();
    entries
        .par_iter()
        .map(|(key, image)| ((*key).clone(), summarise_image(image, regions)))
        .collect()
}
