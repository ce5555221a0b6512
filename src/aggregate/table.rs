use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::annotation::IonKey;

use super::{AggregateError, RegionStats};

/// Statistics for every `(ion, region)` pair.
///
/// Ions iterate in [`IonKey`] order; regions keep the label order of the
/// mask they were computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionStatisticsTable {
    regions: Vec<String>,
    region_index: HashMap<String, usize>,
    region_sizes: Vec<usize>,
    rows: BTreeMap<IonKey, Vec<RegionStats>>,
}

impl RegionStatisticsTable {
    /// Create an empty table over the given regions
    pub fn new(regions: Vec<String>) -> Result<Self, AggregateError> {
        let mut region_index = HashMap::with_capacity(regions.len());
        for (idx, name) in regions.iter().enumerate() {
            if region_index.insert(name.clone(), idx).is_some() {
                return Err(AggregateError::DuplicateRegion(name.clone()));
            }
        }
        Ok(Self {
            region_sizes: vec![0; regions.len()],
            regions,
            region_index,
            rows: BTreeMap::new(),
        })
    }

    /// Add one ion's statistics, one entry per region in label order.
    /// Replaces an existing row for the same ion.
    ///
    /// The first row fixes the pixel count of every region; later rows must
    /// report the same counts.
    pub fn insert(&mut self, key: IonKey, stats: Vec<RegionStats>) -> Result<(), AggregateError> {
        if stats.len() != self.regions.len() {
            return Err(AggregateError::RowLength {
                key,
                expected: self.regions.len(),
                found: stats.len(),
            });
        }

        if self.rows.is_empty() {
            self.region_sizes = stats.iter().map(|s| s.pixel_count).collect();
        } else if let Some(label) = (0..stats.len())
            .find(|&label| stats[label].pixel_count != self.region_sizes[label])
        {
            return Err(AggregateError::PixelCountMismatch {
                key,
                region: self.regions[label].clone(),
                expected: self.region_sizes[label],
                found: stats[label].pixel_count,
            });
        }

        self.rows.insert(key, stats);
        Ok(())
    }

    /// Region sizes for a table that may hold no rows yet
    pub(crate) fn set_region_sizes(&mut self, sizes: Vec<usize>) {
        debug_assert_eq!(sizes.len(), self.regions.len());
        self.region_sizes = sizes;
    }

    /// Region names in label order
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Whether `region` is one of the table's regions
    pub fn has_region(&self, region: &str) -> bool {
        self.region_index.contains_key(region)
    }

    /// Label of a region name
    pub fn region_label(&self, region: &str) -> Option<usize> {
        self.region_index.get(region).copied()
    }

    /// Pixel count of every region, in label order
    pub fn region_sizes(&self) -> &[usize] {
        &self.region_sizes
    }

    /// Names of regions without pixels
    pub fn empty_regions(&self) -> Vec<&str> {
        self.regions
            .iter()
            .zip(&self.region_sizes)
            .filter(|(_, &size)| size == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Ions in key order
    pub fn ions(&self) -> impl Iterator<Item = &IonKey> {
        self.rows.keys()
    }

    /// Number of ions
    pub fn ion_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of `(ion, region)` cells
    pub fn len(&self) -> usize {
        self.rows.len() * self.regions.len()
    }

    /// Whether the table holds no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Statistics for one ion in one region
    pub fn get(&self, key: &IonKey, region: &str) -> Option<&RegionStats> {
        let label = self.region_label(region)?;
        self.rows.get(key).and_then(|row| row.get(label))
    }

    /// All region statistics of one ion, in label order
    pub fn row(&self, key: &IonKey) -> Option<&[RegionStats]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    /// Iterate rows in ion key order
    pub fn rows(&self) -> impl Iterator<Item = (&IonKey, &[RegionStats])> {
        self.rows.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Iterate every cell as `(ion, region, stats)`, ion-major
    pub fn cells(&self) -> impl Iterator<Item = (&IonKey, &str, &RegionStats)> {
        self.rows.iter().flat_map(move |(key, row)| {
            self.regions
                .iter()
                .zip(row)
                .map(move |(region, stats)| (key, region.as_str(), stats))
        })
    }
}

impl fmt::Display for RegionStatisticsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region statistics: {} ions x {} regions ({} empty regions)",
            self.ion_count(),
            self.regions.len(),
            self.empty_regions().len()
        )
    }
}
