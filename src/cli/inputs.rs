//! Resolution and loading of run inputs shared by the `report` and
//! `aggregate` commands.

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use std::path::PathBuf;

use mzspot::aggregate::EmptyRegionPolicy;
use mzspot::annotation::AnnotationTable;
use mzspot::export::{ParquetExportConfig, ReportExporter, ReportNaming};
use mzspot::grid::{GridParams, RegionMask};
use mzspot::image::ImageStack;

use super::config::Config;

/// FDR used in output names when no annotation table restricts the run
const DEFAULT_FDR: f64 = 0.1;

fn or_placeholder(value: Option<String>, what: &str, placeholder: &str) -> String {
    value.unwrap_or_else(|| {
        warn!("No {} given, output files are named with \"{}\"", what, placeholder);
        placeholder.to_string()
    })
}

/// Input and output flags common to the run commands
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Load settings from a TOML run file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dataset identifier (used in output file names)
    #[arg(long)]
    pub dataset_id: Option<String>,

    /// FDR level the annotations were retrieved at
    #[arg(long)]
    pub fdr: Option<f64>,

    /// Annotation database name
    #[arg(long)]
    pub database: Option<String>,

    /// Region label matrix (.tsv or .csv)
    #[arg(long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Grid layout JSON with region names; rasterised when no mask is given
    #[arg(long, value_name = "FILE")]
    pub grid: Option<PathBuf>,

    /// Image manifest CSV with formula,adduct,path columns
    #[arg(long, value_name = "FILE")]
    pub images: Option<PathBuf>,

    /// Annotation table; only ions listed here (after FDR filtering) are used
    #[arg(long, value_name = "FILE")]
    pub annotations: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Also write long-format Parquet statistics
    #[arg(long, overrides_with = "no_parquet")]
    pub parquet: bool,

    /// Skip the Parquet statistics even if the config enables them
    #[arg(long, overrides_with = "parquet")]
    pub no_parquet: bool,

    /// Empty region handling
    #[arg(long, value_enum)]
    pub empty_region: Option<EmptyRegionArg>,
}

/// Empty region handling on the command line
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EmptyRegionArg {
    /// Keep empty regions with NaN mean and std
    Nan,
    /// Abort on the first empty region
    Fail,
}

impl From<EmptyRegionArg> for EmptyRegionPolicy {
    fn from(arg: EmptyRegionArg) -> Self {
        match arg {
            EmptyRegionArg::Nan => EmptyRegionPolicy::Nan,
            EmptyRegionArg::Fail => EmptyRegionPolicy::Fail,
        }
    }
}

/// Settings after merging the config file with command line overrides
#[derive(Debug)]
pub struct RunSettings {
    pub naming: ReportNaming,
    pub mask: Option<PathBuf>,
    pub grid: PathBuf,
    pub images: PathBuf,
    pub annotations: Option<PathBuf>,
    pub targets: Option<PathBuf>,
    pub out: PathBuf,
    pub parquet: Option<ParquetExportConfig>,
    pub policy: EmptyRegionPolicy,
}

/// Regions and images ready for aggregation
pub struct LoadedInputs {
    pub mask: RegionMask,
    pub region_names: Vec<String>,
    pub images: ImageStack,
}

impl RunSettings {
    /// Merge `args` over the optional config file. `targets` is the command
    /// line target list, if the command takes one.
    pub fn resolve(args: RunArgs, targets: Option<PathBuf>) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let grid = args
            .grid
            .or(config.inputs.grid_params)
            .context("No grid layout given (--grid or inputs.grid_params)")?;
        let images = args
            .images
            .or(config.inputs.images)
            .context("No image manifest given (--images or inputs.images)")?;

        let annotations = args.annotations.or(config.inputs.annotations);
        let fdr = match args.fdr.or(config.dataset.fdr) {
            Some(fdr) => fdr,
            None if annotations.is_some() => {
                return Err(anyhow!(
                    "An annotation table needs the FDR level it was retrieved at \
                     (--fdr or dataset.fdr)"
                ))
            }
            None => {
                warn!("No FDR level given, output files are named with fdr{}", DEFAULT_FDR);
                DEFAULT_FDR
            }
        };
        let naming = ReportNaming::new(
            or_placeholder(args.dataset_id.or(config.dataset.id), "dataset id", "dataset"),
            fdr,
            or_placeholder(args.database.or(config.dataset.database), "database", "database"),
        );

        let write_parquet = if args.no_parquet {
            false
        } else {
            args.parquet || config.output.parquet.unwrap_or(false)
        };
        let parquet = write_parquet.then(|| {
            let mut parquet = ParquetExportConfig::default();
            if let Some(level) = config.output.compression_level {
                parquet.compression_level = level;
            }
            parquet
        });

        Ok(Self {
            naming,
            mask: args.mask.or(config.inputs.mask),
            grid,
            images,
            annotations,
            targets: targets.or(config.inputs.targets),
            out: args
                .out
                .or(config.output.dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            parquet,
            policy: args
                .empty_region
                .map(EmptyRegionPolicy::from)
                .or(config.aggregation.empty_region)
                .unwrap_or_default(),
        })
    }

    /// Exporter configured for these settings
    pub fn exporter(&self) -> ReportExporter {
        let exporter = ReportExporter::new(self.naming.clone());
        match &self.parquet {
            Some(config) => exporter.with_parquet(config.clone()),
            None => exporter,
        }
    }

    /// Load the region mask, region names and ion images
    pub fn load(&self) -> Result<LoadedInputs> {
        let params = GridParams::from_json_file(&self.grid)
            .with_context(|| format!("Failed to read grid layout {}", self.grid.display()))?;
        let region_names = params.region_names().context("Invalid grid layout")?;

        let mut images = ImageStack::from_manifest(&self.images)
            .with_context(|| format!("Failed to load images from {}", self.images.display()))?;

        if let Some(path) = &self.annotations {
            let table = AnnotationTable::from_csv_file(path)
                .with_context(|| format!("Failed to read annotations {}", path.display()))?
                .filter_by_fdr(self.naming.fdr)
                .dedup_by_ion();
            info!(
                "{} annotations at FDR <= {} in {}",
                table.len(),
                self.naming.fdr,
                path.display()
            );
            images.retain_keys(&table.keys());
        }

        let mask = match &self.mask {
            Some(path) => RegionMask::from_file(path)
                .with_context(|| format!("Failed to read region mask {}", path.display()))?,
            None => {
                let (height, width) = images
                    .iter()
                    .next()
                    .map(|(_, image)| image.shape())
                    .context("No mask given and no images to take the shape from")?;
                info!("Rasterising grid layout onto a {}x{} mask", height, width);
                params.rasterize(height, width)
            }
        };

        if images.is_empty() {
            warn!("No ion images to aggregate");
        }

        Ok(LoadedInputs {
            mask,
            region_names,
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const RUN_TOML: &str = r#"
        [dataset]
        id = "2020-03-12_17h55m21s"
        fdr = 0.5
        database = "SwissLipids-2018-02-02"

        [inputs]
        mask = "grid_mask.tsv"
        grid_params = "grid_params.json"
        images = "images.csv"
        annotations = "annotations.csv"

        [aggregation]
        empty_region = "fail"

        [output]
        dir = "out"
        parquet = true
    "#;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn args_with_config(path: &std::path::Path) -> RunArgs {
        RunArgs {
            config: Some(path.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_values_used() {
        let (dir, path) = write_config(RUN_TOML);
        let settings = RunSettings::resolve(args_with_config(&path), None).unwrap();

        assert_eq!(
            settings.naming.stem(),
            "2020-03-12_17h55m21s_fdr0.5_SwissLipids-2018-02-02"
        );
        assert_eq!(settings.mask, Some(dir.path().join("grid_mask.tsv")));
        assert_eq!(settings.grid, dir.path().join("grid_params.json"));
        assert_eq!(settings.out, dir.path().join("out"));
        assert_eq!(settings.policy, EmptyRegionPolicy::Fail);
        assert!(settings.parquet.is_some());
    }

    #[test]
    fn test_flags_override_config() {
        let (dir, path) = write_config(RUN_TOML);
        let args = RunArgs {
            fdr: Some(0.1),
            database: Some("HMDB-v4".to_string()),
            mask: Some(PathBuf::from("/data/other_mask.tsv")),
            out: Some(PathBuf::from("/data/reports")),
            empty_region: Some(EmptyRegionArg::Nan),
            no_parquet: true,
            ..args_with_config(&path)
        };
        let settings = RunSettings::resolve(args, None).unwrap();

        assert_eq!(settings.naming.stem(), "2020-03-12_17h55m21s_fdr0.1_HMDB-v4");
        assert_eq!(settings.mask, Some(PathBuf::from("/data/other_mask.tsv")));
        assert_eq!(settings.out, PathBuf::from("/data/reports"));
        // Inputs not given on the command line still come from the config
        assert_eq!(settings.images, dir.path().join("images.csv"));
        assert_eq!(settings.annotations, Some(dir.path().join("annotations.csv")));
        assert_eq!(settings.policy, EmptyRegionPolicy::Nan);
        assert!(settings.parquet.is_none());
    }

    #[test]
    fn test_targets_flag_over_config() {
        let (dir, path) = write_config(
            r#"
            [inputs]
            grid_params = "grid_params.json"
            images = "images.csv"
            targets = "Molecules.csv"
            "#,
        );
        let from_config = RunSettings::resolve(args_with_config(&path), None).unwrap();
        assert_eq!(from_config.targets, Some(dir.path().join("Molecules.csv")));

        let from_flag =
            RunSettings::resolve(args_with_config(&path), Some(PathBuf::from("/data/t.csv")))
                .unwrap();
        assert_eq!(from_flag.targets, Some(PathBuf::from("/data/t.csv")));
    }

    #[test]
    fn test_default_policy_without_config_or_flag() {
        let args = RunArgs {
            grid: Some(PathBuf::from("grid_params.json")),
            images: Some(PathBuf::from("images.csv")),
            dataset_id: Some("ds".to_string()),
            database: Some("db".to_string()),
            ..Default::default()
        };
        let settings = RunSettings::resolve(args, None).unwrap();
        assert_eq!(settings.policy, EmptyRegionPolicy::Nan);
        assert!(settings.parquet.is_none());
        assert_eq!(settings.out, PathBuf::from("."));
    }

    #[test]
    fn test_annotations_require_fdr() {
        let (_dir, path) = write_config(
            r#"
            [inputs]
            grid_params = "grid_params.json"
            images = "images.csv"
            annotations = "annotations.csv"
            "#,
        );
        let err = RunSettings::resolve(args_with_config(&path), None).unwrap_err();
        assert!(err.to_string().contains("FDR"));

        let args = RunArgs {
            fdr: Some(0.5),
            ..args_with_config(&path)
        };
        let settings = RunSettings::resolve(args, None).unwrap();
        assert_eq!(settings.naming.fdr, 0.5);
    }

    #[test]
    fn test_parquet_flag_enables_output() {
        let args = RunArgs {
            grid: Some(PathBuf::from("grid_params.json")),
            images: Some(PathBuf::from("images.csv")),
            parquet: true,
            ..Default::default()
        };
        let settings = RunSettings::resolve(args, None).unwrap();
        assert!(settings.parquet.is_some());
    }
}
