//! Long-format Parquet output of the region statistics table.
//!
//! One row per `(ion, region)` cell, so the file can be filtered and pivoted
//! by any Parquet-compatible tool.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, StringBuilder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;

use crate::aggregate::RegionStatisticsTable;

use super::{ExportError, ReportNaming};

/// Column names of the statistics Parquet file
pub mod columns {
    /// Ion formula
    pub const FORMULA: &str = "formula";
    /// Ion adduct
    pub const ADDUCT: &str = "adduct";
    /// Region (well) name
    pub const REGION: &str = "region";
    /// Pixels in the region
    pub const PIXEL_COUNT: &str = "pixel_count";
    /// Sum of intensities
    pub const SUM: &str = "sum";
    /// Mean intensity
    pub const MEAN: &str = "mean";
    /// Population standard deviation
    pub const STD: &str = "std";
    /// Percent of non-zero pixels
    pub const OCCUPANCY: &str = "occupancy";
}

/// Footer metadata key for the dataset identifier
pub const KEY_DATASET_ID: &str = "mzspot:dataset_id";
/// Footer metadata key for the FDR level
pub const KEY_FDR: &str = "mzspot:fdr";
/// Footer metadata key for the annotation database
pub const KEY_DATABASE: &str = "mzspot:database";
/// Footer metadata key for the creation timestamp
pub const KEY_CREATED: &str = "mzspot:created";
/// Footer metadata key for the writing software
pub const KEY_SOFTWARE: &str = "mzspot:software";

/// Arrow schema of the statistics file
pub fn statistics_schema() -> Schema {
    Schema::new(vec![
        Field::new(columns::FORMULA, DataType::Utf8, false),
        Field::new(columns::ADDUCT, DataType::Utf8, false),
        Field::new(columns::REGION, DataType::Utf8, false),
        Field::new(columns::PIXEL_COUNT, DataType::UInt64, false),
        Field::new(columns::SUM, DataType::Float64, false),
        Field::new(columns::MEAN, DataType::Float64, false),
        Field::new(columns::STD, DataType::Float64, false),
        Field::new(columns::OCCUPANCY, DataType::Float64, false),
    ])
}

/// Configuration for the statistics Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetExportConfig {
    /// ZSTD compression level
    pub compression_level: i32,

    /// Maximum rows per row group
    pub row_group_size: usize,

    /// Whether to write column chunk statistics
    pub write_statistics: bool,
}

impl Default for ParquetExportConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
            row_group_size: 100_000,
            write_statistics: true,
        }
    }
}

impl ParquetExportConfig {
    fn to_writer_properties(&self, metadata: &HashMap<String, String>) -> WriterProperties {
        let compression = Compression::ZSTD(
            ZstdLevel::try_new(self.compression_level).unwrap_or(ZstdLevel::default()),
        );

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();

        WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size)
            .set_key_value_metadata(Some(kv_metadata))
            .build()
    }
}

/// Footer metadata describing the run
pub fn footer_metadata(naming: &ReportNaming) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert(KEY_DATASET_ID.to_string(), naming.dataset_id.clone());
    metadata.insert(KEY_FDR.to_string(), naming.fdr.to_string());
    metadata.insert(KEY_DATABASE.to_string(), naming.database.clone());
    metadata.insert(KEY_CREATED.to_string(), chrono::Utc::now().to_rfc3339());
    metadata.insert(
        KEY_SOFTWARE.to_string(),
        format!("mzspot v{}", env!("CARGO_PKG_VERSION")),
    );
    metadata
}

/// Write the statistics table to a Parquet file
pub fn write_statistics_parquet_file<P: AsRef<Path>>(
    path: P,
    table: &RegionStatisticsTable,
    naming: &ReportNaming,
    config: &ParquetExportConfig,
) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    write_statistics_parquet(file, table, naming, config)
}

/// Write the statistics table as Parquet to any writer.
/// Returns the number of rows written.
pub fn write_statistics_parquet<W: Write + Send>(
    writer: W,
    table: &RegionStatisticsTable,
    naming: &ReportNaming,
    config: &ParquetExportConfig,
) -> Result<usize, ExportError> {
    let schema = Arc::new(statistics_schema());
    let props = config.to_writer_properties(&footer_metadata(naming));
    let mut arrow_writer = ArrowWriter::try_new(writer, schema.clone(), Some(props))?;

    let n = table.len();
    let mut formula_builder = StringBuilder::with_capacity(n, n * 16);
    let mut adduct_builder = StringBuilder::with_capacity(n, n * 4);
    let mut region_builder = StringBuilder::with_capacity(n, n * 4);
    let mut count_builder = UInt64Builder::with_capacity(n);
    let mut sum_builder = Float64Builder::with_capacity(n);
    let mut mean_builder = Float64Builder::with_capacity(n);
    let mut std_builder = Float64Builder::with_capacity(n);
    let mut occupancy_builder = Float64Builder::with_capacity(n);

    for (key, region, stats) in table.cells() {
        formula_builder.append_value(&key.formula);
        adduct_builder.append_value(&key.adduct);
        region_builder.append_value(region);
        count_builder.append_value(stats.pixel_count as u64);
        sum_builder.append_value(stats.sum);
        mean_builder.append_value(stats.mean);
        std_builder.append_value(stats.std);
        occupancy_builder.append_value(stats.occupancy);
    }

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(formula_builder.finish()),
        Arc::new(adduct_builder.finish()),
        Arc::new(region_builder.finish()),
        Arc::new(count_builder.finish()),
        Arc::new(sum_builder.finish()),
        Arc::new(mean_builder.finish()),
        Arc::new(std_builder.finish()),
        Arc::new(occupancy_builder.finish()),
    ];

    let batch = RecordBatch::try_new(schema, arrays)?;
    arrow_writer.write(&batch)?;
    arrow_writer.close()?;

    Ok(n)
}
