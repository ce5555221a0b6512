use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Summary of one ion's intensities inside one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Number of pixels in the region
    pub pixel_count: usize,

    /// Sum of intensities
    pub sum: f64,

    /// Arithmetic mean (NaN for an empty region)
    pub mean: f64,

    /// Population standard deviation (NaN for an empty region)
    pub std: f64,

    /// Percentage of pixels with strictly positive intensity, 0-100
    pub occupancy: f64,
}

impl RegionStats {
    /// All-zero statistics, used for targets without a matching annotation
    pub const ZERO: RegionStats = RegionStats {
        pixel_count: 0,
        sum: 0.0,
        mean: 0.0,
        std: 0.0,
        occupancy: 0.0,
    };

    /// Compute statistics over the pixel values of a region.
    ///
    /// An empty region yields zero sum and occupancy with NaN mean and std.
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self {
                pixel_count: 0,
                sum: 0.0,
                mean: f64::NAN,
                std: f64::NAN,
                occupancy: 0.0,
            };
        }

        let count = n as f64;
        let sum: f64 = values.iter().sum();
        let mean = sum / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let positive = values.iter().filter(|&&v| v > 0.0).count();

        Self {
            pixel_count: n,
            sum,
            mean,
            std: variance.sqrt(),
            occupancy: 100.0 * positive as f64 / count,
        }
    }

    /// Gather `pixels[idx]` for every index and compute statistics.
    /// Indices must lie within `pixels`; `aggregate` checks image shapes first.
    pub(crate) fn from_indices(pixels: &[f64], indices: &[usize]) -> Self {
        let values: Vec<f64> = indices.iter().map(|&i| pixels[i]).collect();
        Self::from_values(&values)
    }

    /// Value of a single statistic
    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Sum => self.sum,
            Statistic::Mean => self.mean,
            Statistic::Std => self.std,
            Statistic::Occupancy => self.occupancy,
        }
    }
}

/// Statistic kinds written out as separate tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Sum of intensities
    Sum,
    /// Mean intensity
    Mean,
    /// Population standard deviation
    Std,
    /// Percent of non-zero pixels
    Occupancy,
}

impl Statistic {
    /// Every statistic, in output order
    pub const ALL: [Statistic; 4] = [
        Statistic::Sum,
        Statistic::Mean,
        Statistic::Std,
        Statistic::Occupancy,
    ];

    /// Lowercase name used in file names and column headers
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Sum => "sum",
            Statistic::Mean => "mean",
            Statistic::Std => "std",
            Statistic::Occupancy => "occupancy",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Statistic::Sum),
            "mean" => Ok(Statistic::Mean),
            "std" => Ok(Statistic::Std),
            "occupancy" => Ok(Statistic::Occupancy),
            other => Err(format!("Unknown statistic: {}", other)),
        }
    }
}

/// What to do when a region label has no pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyRegionPolicy {
    /// Keep the region; its mean and std are NaN, sum and occupancy zero
    #[default]
    Nan,
    /// Abort aggregation with [`AggregateError::EmptyRegion`]
    ///
    /// [`AggregateError::EmptyRegion`]: super::AggregateError::EmptyRegion
    Fail,
}
