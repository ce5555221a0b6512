//! # mzspot - Spot-wise analysis of imaging mass spectrometry annotations
//!
//! `mzspot` summarises ion images from an imaging MS annotation service
//! (METASPACE) within spatial regions, typically the spots of a
//! microtiter-plate-like grid printed onto a slide, and reports which
//! annotation best explains each molecule that was deliberately spotted.
//!
//! ## Pipeline
//!
//! ```text
//! annotations + ion images + region mask ──> aggregate ──> RegionStatisticsTable
//!                                                              │
//!                                    target list ──> match_targets ──> Report
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mzspot::aggregate::{aggregate, EmptyRegionPolicy};
//! use mzspot::annotation::IonKey;
//! use mzspot::grid::RegionMask;
//! use mzspot::image::{ImageStack, IntensityImage};
//! use mzspot::matcher::{match_targets, Target};
//!
//! let mask = RegionMask::from_rows(&[vec![0, 0, 1], vec![0, 1, 1]])?;
//! let names = vec!["A".to_string(), "B".to_string()];
//!
//! let mut images = ImageStack::new();
//! images.insert(
//!     IonKey::new("C6H12O6", "+"),
//!     IntensityImage::from_rows(&[vec![2.0, 0.0, 5.0], vec![0.0, 3.0, 4.0]])?,
//! )?;
//!
//! let table = aggregate(&mask, &names, &images, EmptyRegionPolicy::Nan)?;
//! let report = match_targets(&[Target::new("A", "C6H12O6", "Glucose")], &table)?;
//!
//! let row = &report.rows[0];
//! assert_eq!(row.stats.sum, 2.0);
//! assert!((row.stats.occupancy - 100.0 / 3.0).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`annotation`]: structured ion keys and annotation table helpers
//! - [`image`]: ion intensity images and delimited matrix input
//! - [`grid`]: region masks and plate grid layouts
//! - [`aggregate`]: per-region statistics
//! - [`matcher`]: target lists and best-annotation matching
//! - [`export`]: CSV and Parquet report output

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aggregate;
pub mod annotation;
pub mod export;
pub mod grid;
pub mod image;
pub mod matcher;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aggregate::{
        aggregate, AggregateError, EmptyRegionPolicy, RegionStatisticsTable, RegionStats,
        Statistic,
    };
    pub use crate::annotation::{base_formula, Annotation, AnnotationError, AnnotationTable, IonKey};
    pub use crate::export::{
        ExportError, ExportSummary, ParquetExportConfig, ReportExporter, ReportNaming,
    };
    pub use crate::grid::{GridError, GridParams, RegionMask};
    pub use crate::image::{ImageError, ImageStack, IntensityImage};
    pub use crate::matcher::{match_targets, MatchError, Report, ReportRow, Target};
}
