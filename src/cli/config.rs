//! TOML run configuration.
//!
//! Instead of passing every input on the command line, a run can be described
//! in a config file. Relative paths resolve against the file's directory.
//!
//! ```toml
//! # run.toml
//! [dataset]
//! id = "2020-03-12_17h55m21s"
//! fdr = 0.5
//! database = "SwissLipids-2018-02-02"
//!
//! [inputs]
//! mask = "grid_mask.tsv"
//! grid_params = "grid_params.json"
//! images = "images.csv"
//! targets = "Molecules.csv"
//! annotations = "annotations.csv"
//!
//! [aggregation]
//! empty_region = "nan"
//!
//! [output]
//! dir = "out"
//! parquet = true
//! ```

use anyhow::{Context, Result};
use mzspot::aggregate::EmptyRegionPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for run files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Dataset identity used for output naming.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Input file locations.
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Aggregation behaviour.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Dataset identity.
#[derive(Debug, Default, Deserialize)]
pub struct DatasetConfig {
    /// Dataset identifier at the annotation service.
    pub id: Option<String>,

    /// FDR level annotations were retrieved at.
    pub fdr: Option<f64>,

    /// Annotation database name.
    pub database: Option<String>,
}

/// Input file locations.
#[derive(Debug, Default, Deserialize)]
pub struct InputsConfig {
    /// Region label matrix.
    pub mask: Option<PathBuf>,

    /// Grid layout JSON (region names, optional rasterisation).
    pub grid_params: Option<PathBuf>,

    /// Image manifest CSV.
    pub images: Option<PathBuf>,

    /// Target list.
    pub targets: Option<PathBuf>,

    /// Annotation table used to restrict the ion images.
    pub annotations: Option<PathBuf>,
}

/// Aggregation settings.
#[derive(Debug, Default, Deserialize)]
pub struct AggregationConfig {
    /// Empty region handling (`nan` or `fail`).
    pub empty_region: Option<EmptyRegionPolicy>,
}

/// Output settings.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Output directory.
    pub dir: Option<PathBuf>,

    /// Also write the long-format Parquet statistics file.
    pub parquet: Option<bool>,

    /// ZSTD compression level for Parquet output.
    pub compression_level: Option<i32>,
}

impl Config {
    /// Load configuration from a TOML file, resolving relative paths against
    /// the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    fn resolve_paths(&mut self, base: &Path) {
        let inputs = &mut self.inputs;
        for path in [
            &mut inputs.mask,
            &mut inputs.grid_params,
            &mut inputs.images,
            &mut inputs.targets,
            &mut inputs.annotations,
            &mut self.output.dir,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
