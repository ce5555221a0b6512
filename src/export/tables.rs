use std::io::Write;

use crate::aggregate::{RegionStatisticsTable, Statistic};
use crate::matcher::Report;

use super::ExportError;

/// Column headers of the combined target report
pub const REPORT_HEADER: [&str; 8] = [
    "well",
    "formula",
    "molecule",
    "ion",
    "sum",
    "mean",
    "std",
    "occupancy",
];

/// Write one statistic as a wide table: an `ion` column followed by one
/// column per region, one row per ion in key order.
///
/// Empty regions show `NaN` for mean and std.
pub fn write_statistic_table<W: Write>(
    table: &RegionStatisticsTable,
    statistic: Statistic,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.regions().len() + 1);
    header.push("ion");
    header.extend(table.regions().iter().map(String::as_str));
    csv_writer.write_record(&header)?;

    for (key, row) in table.rows() {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(key.ion());
        record.extend(row.iter().map(|s| s.get(statistic).to_string()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the target report, one row per target in list order.
/// Unmatched targets have an empty `ion` field and zero statistics.
pub fn write_report<W: Write>(report: &Report, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REPORT_HEADER)?;

    for row in &report.rows {
        csv_writer.write_record([
            row.target.well.clone(),
            row.target.formula.clone(),
            row.target.molecule.clone(),
            row.matched.as_ref().map(|k| k.ion()).unwrap_or_default(),
            row.stats.sum.to_string(),
            row.stats.mean.to_string(),
            row.stats.std.to_string(),
            row.stats.occupancy.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
